use figment::Jail;
use pretty_assertions::assert_eq;
use tw_config::TradewindConfig;

#[test]
fn env_vars_fill_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("TRADEWIND_BACKEND__URL", "https://proj.example.co");
        jail.set_env("TRADEWIND_BACKEND__ANON_KEY", "anon_from_env");
        jail.set_env("TRADEWIND_AUTH__BOOTSTRAP_TIMEOUT_SECS", "3");

        let config: TradewindConfig = TradewindConfig::figment()
            .extract()
            .expect("config extracts");
        assert_eq!(config.backend.url, "https://proj.example.co");
        assert_eq!(config.backend.anon_key, "anon_from_env");
        assert!(config.backend.is_configured());
        assert_eq!(config.auth.bootstrap_timeout_secs, 3);
        Ok(())
    });
}

#[test]
fn env_beats_project_toml() {
    Jail::expect_with(|jail| {
        jail.create_dir(".tradewind")?;
        jail.create_file(
            ".tradewind/config.toml",
            r#"
                [backend]
                url = "https://from-toml.example.co"
                anon_key = "anon_from_toml"
            "#,
        )?;
        jail.set_env("TRADEWIND_BACKEND__ANON_KEY", "anon_from_env");

        let config: TradewindConfig = TradewindConfig::figment()
            .extract()
            .expect("config extracts");
        assert_eq!(config.backend.url, "https://from-toml.example.co");
        assert_eq!(config.backend.anon_key, "anon_from_env");
        Ok(())
    });
}

#[test]
fn toml_fills_realtime_section() {
    Jail::expect_with(|jail| {
        jail.create_dir(".tradewind")?;
        jail.create_file(
            ".tradewind/config.toml",
            r#"
                [realtime]
                poll_interval_ms = 500
            "#,
        )?;

        let config: TradewindConfig = TradewindConfig::figment()
            .extract()
            .expect("config extracts");
        assert_eq!(config.realtime.poll_interval_ms, 500);
        Ok(())
    });
}
