//! Configuration file loading and validation.

use std::path::Path;

use seu_sim::reference::MAX_ADDR_BITS;
use seu_sim::{LinearCode, Traffic};

use crate::error::ConfigError;
use crate::types::CampaignConfig;

/// Loads and validates a campaign configuration file.
pub fn load_config(path: &Path) -> Result<CampaignConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a campaign configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<CampaignConfig, ConfigError> {
    let config: CampaignConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that the configured design can be built and the run is sane.
///
/// Command-line overrides are merged into a config before a run, so the
/// merged result is validated again through this function.
pub fn validate_config(config: &CampaignConfig) -> Result<(), ConfigError> {
    let dut = &config.dut;
    if dut.addr_bits == 0 || dut.addr_bits > MAX_ADDR_BITS {
        return Err(ConfigError::ValidationError(format!(
            "dut.addr_bits must be in 1..={MAX_ADDR_BITS}, got {}",
            dut.addr_bits
        )));
    }
    if dut.data_bits == 0 {
        return Err(ConfigError::ValidationError(
            "dut.data_bits must be at least 1".to_string(),
        ));
    }
    LinearCode::new(dut.code, dut.data_bits)
        .map_err(|e| ConfigError::ValidationError(format!("dut.code: {e}")))?;
    match dut.traffic {
        Traffic::WriteEvery(0) => {
            return Err(ConfigError::ValidationError(
                "dut.traffic write-every must be at least 1".to_string(),
            ));
        }
        Traffic::External => {
            return Err(ConfigError::ValidationError(
                "dut.traffic 'external' needs a driver and cannot be used from a campaign file"
                    .to_string(),
            ));
        }
        Traffic::ReadSweep | Traffic::WriteEvery(_) => {}
    }
    if config.run.runs == 0 {
        return Err(ConfigError::ValidationError(
            "run.runs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportFormat;
    use seu_sim::CodeKind;

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, CampaignConfig::default());
        assert_eq!(config.dut.addr_bits, 4);
        assert_eq!(config.dut.data_bits, 11);
        assert_eq!(config.dut.code, CodeKind::Hsiao);
        assert_eq!(config.dut.traffic, Traffic::ReadSweep);
        assert_eq!(config.run.seed, None);
        assert_eq!(config.run.runs, 1);
        assert_eq!(config.output.format, ReportFormat::Text);
        assert!(config.output.waveform.is_none());
        assert!(!config.output.dump_memory);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[dut]
addr_bits = 6
data_bits = 32
code = "parity"
traffic = { write-every = 4 }

[run]
seed = 1234
runs = 8

[output]
waveform = "out/run.vcd"
format = "json"
dump_memory = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.dut.addr_bits, 6);
        assert_eq!(config.dut.data_bits, 32);
        assert_eq!(config.dut.code, CodeKind::Parity);
        assert_eq!(config.dut.traffic, Traffic::WriteEvery(4));
        assert_eq!(config.run.seed, Some(1234));
        assert_eq!(config.run.runs, 8);
        assert_eq!(
            config.output.waveform.as_deref(),
            Some(Path::new("out/run.vcd"))
        );
        assert_eq!(config.output.format, ReportFormat::Json);
        assert!(config.output.dump_memory);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[dut]\ncode = \"identity\"\n").unwrap();
        assert_eq!(config.dut.code, CodeKind::Identity);
        assert_eq!(config.dut.addr_bits, 4);
        assert_eq!(config.dut.data_bits, 11);
    }

    #[test]
    fn read_sweep_traffic_string() {
        let config = load_config_from_str("[dut]\ntraffic = \"read-sweep\"\n").unwrap();
        assert_eq!(config.dut.traffic, Traffic::ReadSweep);
    }

    #[test]
    fn addr_bits_out_of_range() {
        for bits in [0, 21] {
            let err = load_config_from_str(&format!("[dut]\naddr_bits = {bits}\n")).unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError(_)), "{bits}");
        }
    }

    #[test]
    fn zero_data_bits_rejected() {
        let err = load_config_from_str("[dut]\ndata_bits = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn too_wide_codeword_rejected() {
        // 58 data bits need 8 Hsiao check bits: 66 > 64.
        let err = load_config_from_str("[dut]\ndata_bits = 58\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.starts_with("dut.code")));
        assert!(load_config_from_str("[dut]\ndata_bits = 57\n").is_ok());
    }

    #[test]
    fn zero_write_interval_rejected() {
        let err = load_config_from_str("[dut]\ntraffic = { write-every = 0 }\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn external_traffic_rejected() {
        let err = load_config_from_str("[dut]\ntraffic = \"external\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_runs_rejected() {
        let err = load_config_from_str("[run]\nruns = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_code_is_parse_error() {
        let err = load_config_from_str("[dut]\ncode = \"hamming\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seu.toml");
        std::fs::write(&path, "[run]\nseed = 7\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.run.seed, Some(7));
    }

    #[test]
    fn io_error_from_missing_file() {
        let err = load_config(Path::new("/nonexistent/dir/seu.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
