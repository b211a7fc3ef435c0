pub const LOG_ZERO: f64 = -1.0e10;
pub const LOG_TWO: f64 = 0.693147180559945;
pub const LOG_TWO_PI: f64 = 1.83787706640935;
/// 20 / ln(10), converts natural log amplitude to decibels.
pub const NEPER: f64 = 8.685889638065035;
pub const MIN_SAMPLING_RATE: f64 = 6000.0;
pub const MAX_SAMPLING_RATE: f64 = 98000.0;
pub const CONFIG_FILE: &str = "sptk.ini";
use ini::Ini;
use once_cell::sync::Lazy;
use std::collections::HashMap;
#[derive(Debug, Clone, PartialEq)]
pub struct SptkConfig {
    pub log_level: String,
    pub lsp_num_split: usize,
    pub lsp_num_iteration: usize,
    pub lsp_convergence_threshold: f64,
    pub csm_num_iteration: usize,
    pub csm_convergence_threshold: f64,
    pub gmm_log_interval: usize,
    pub fft_length: usize,
}
pub static SPTK_CONFIG: Lazy<SptkConfig> = Lazy::new(|| load_sptk_config(CONFIG_FILE));
pub fn load_sptk_config(path: &str) -> SptkConfig {
    let ini = match Ini::load_from_file(path) {
        Ok(ini) => ini,
        Err(_) => return SptkConfig::default(),
    };
    let section: HashMap<String, String> = ini
        .section(None::<String>)
        .map(|props| props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
        .unwrap_or_default();
    from_section(&section)
}
fn from_section(section: &HashMap<String, String>) -> SptkConfig {
    let default = SptkConfig::default();
    SptkConfig {
        log_level: section
            .get("log_level")
            .map(|s| s.trim().to_lowercase())
            .filter(|s| ["error", "warn", "info", "debug", "trace"].contains(&s.as_str()))
            .unwrap_or(default.log_level),
        lsp_num_split: section
            .get("lsp_num_split")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default.lsp_num_split),
        lsp_num_iteration: section
            .get("lsp_num_iteration")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default.lsp_num_iteration),
        lsp_convergence_threshold: section
            .get("lsp_convergence_threshold")
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|&x| x >= 0.0)
            .unwrap_or(default.lsp_convergence_threshold),
        csm_num_iteration: section
            .get("csm_num_iteration")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default.csm_num_iteration),
        csm_convergence_threshold: section
            .get("csm_convergence_threshold")
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|&x| x >= 0.0)
            .unwrap_or(default.csm_convergence_threshold),
        gmm_log_interval: section
            .get("gmm_log_interval")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default.gmm_log_interval),
        fft_length: section
            .get("fft_length")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n.is_power_of_two() && n >= 2)
            .unwrap_or(default.fft_length),
    }
}
impl Default for SptkConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            lsp_num_split: 256,
            lsp_num_iteration: 4,
            lsp_convergence_threshold: 1e-6,
            csm_num_iteration: 1000,
            csm_convergence_threshold: 1e-12,
            gmm_log_interval: 1,
            fft_length: 256,
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    #[test]
    fn test_default_config() {
        let default = SptkConfig::default();
        assert_eq!(default.log_level, "info");
        assert_eq!(default.lsp_num_split, 256);
        assert_eq!(default.lsp_num_iteration, 4);
        assert_eq!(default.lsp_convergence_threshold, 1e-6);
        assert_eq!(default.csm_num_iteration, 1000);
        assert_eq!(default.csm_convergence_threshold, 1e-12);
        assert_eq!(default.gmm_log_interval, 1);
        assert_eq!(default.fft_length, 256);
    }
    #[test]
    fn test_missing_file_falls_back() {
        let cfg = load_sptk_config("does/not/exist/sptk.ini");
        assert_eq!(cfg, SptkConfig::default());
    }
    #[test]
    fn test_parse_fault_tolerance() {
        let section: HashMap<String, String> = [
            ("log_level", "DEBUG"),
            ("lsp_num_split", "128"),
            ("lsp_num_iteration", "zero"),
            ("csm_convergence_threshold", "-1"),
            ("fft_length", "300"),
            ("gmm_log_interval", "5"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let cfg = from_section(&section);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.lsp_num_split, 128);
        assert_eq!(cfg.lsp_num_iteration, 4);
        assert_eq!(cfg.csm_convergence_threshold, 1e-12);
        assert_eq!(cfg.fft_length, 256);
        assert_eq!(cfg.gmm_log_interval, 5);
    }
    #[test]
    fn test_global_config_init() {
        let cfg = &SPTK_CONFIG;
        if !Path::new(CONFIG_FILE).exists() {
            assert_eq!(**cfg, SptkConfig::default());
        }
        assert!(cfg.lsp_num_split > 0);
        assert!(cfg.fft_length.is_power_of_two());
    }
    #[test]
    fn test_constants() {
        assert!((LOG_TWO - 2f64.ln()).abs() < 1e-14);
        assert!((NEPER - 20.0 / 10f64.ln()).abs() < 1e-12);
        assert!((LOG_TWO_PI - (2.0 * std::f64::consts::PI).ln()).abs() < 1e-13);
    }
}
