//! Careers-page job applications.

use chrono::Utc;

use tw_backend::{BackendClient, SubmissionError};
use tw_core::entities::JobApplication;
use tw_core::enums::{LeadKind, LeadStatus};

use crate::notify::notify_lead;
use crate::validate::{require, require_email};

/// Bucket resumes are uploaded into.
const RESUME_BUCKET: &str = "resumes";

/// An attached resume, as read from the applicant's file picker.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Careers-page application form.
#[derive(Debug, Clone, Default)]
pub struct JobApplicationForm {
    pub applicant_name: String,
    pub applicant_email: String,
    pub phone: Option<String>,
    pub position: String,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeUpload>,
}

impl JobApplicationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, upload the resume (if attached), insert the application and
    /// fire the notification.
    ///
    /// The resume is uploaded before the row is written so the stored
    /// application always carries a valid `resume_path`. An upload failure
    /// fails the whole submission.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Validation`] for missing fields, or the
    /// backend error from the upload or insert.
    pub async fn submit(self, backend: &BackendClient) -> Result<JobApplication, SubmissionError> {
        require(&self.applicant_name, "applicant name")?;
        require_email(&self.applicant_email, "applicant email")?;
        require(&self.position, "position")?;

        let resume_path = match self.resume {
            Some(resume) => {
                let path = resume_object_path(&self.applicant_email, &resume.file_name);
                let stored = backend
                    .upload(RESUME_BUCKET, &path, resume.bytes, &resume.content_type)
                    .await?;
                Some(stored)
            }
            None => None,
        };

        let application = JobApplication {
            id: None,
            user_id: None,
            applicant_name: self.applicant_name,
            applicant_email: self.applicant_email,
            phone: self.phone,
            position: self.position,
            resume_path,
            cover_letter: self.cover_letter,
            status: LeadStatus::New,
            created_at: None,
            updated_at: None,
        };

        let stored: JobApplication = backend
            .insert(LeadKind::JobApplication.table(), &application)
            .await?;
        notify_lead(backend, LeadKind::JobApplication, &stored).await;
        Ok(stored)
    }
}

/// Object path for a resume: applicant-scoped prefix plus a timestamp so
/// re-applications never overwrite an earlier file.
fn resume_object_path(email: &str, file_name: &str) -> String {
    let prefix = sanitize(email);
    let name = sanitize(file_name);
    format!("{prefix}/{}-{name}", Utc::now().timestamp())
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
