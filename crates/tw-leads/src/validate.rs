//! Field validation shared by the capture forms.

use tw_backend::SubmissionError;

pub(crate) fn require(value: &str, field: &str) -> Result<(), SubmissionError> {
    if value.trim().is_empty() {
        return Err(SubmissionError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str, field: &str) -> Result<(), SubmissionError> {
    require(value, field)?;
    let Some((local, domain)) = value.split_once('@') else {
        return Err(SubmissionError::Validation(format!(
            "{field} is not a valid email address"
        )));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(SubmissionError::Validation(format!(
            "{field} is not a valid email address"
        )));
    }
    Ok(())
}

/// GSTIN shape check: 15 characters — 2-digit state code, 10-character PAN,
/// entity digit, the literal `Z`, checksum character.
pub(crate) fn require_gstin(value: &str) -> Result<(), SubmissionError> {
    let value = value.trim();
    let bytes = value.as_bytes();
    let valid = bytes.len() == 15
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[2..12]
            .iter()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        && (bytes[12].is_ascii_digit() || bytes[12].is_ascii_uppercase())
        && bytes[13] == b'Z'
        && (bytes[14].is_ascii_digit() || bytes[14].is_ascii_uppercase());
    if !valid {
        return Err(SubmissionError::Validation(
            "GSTIN must be a 15-character identifier like 27AAPFU0939F1ZV".into(),
        ));
    }
    Ok(())
}
