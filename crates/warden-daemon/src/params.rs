//! Composition of the server's general command-line parameters.

use std::fmt;
use std::path::PathBuf;

use crate::config::{PathsConfig, ServerConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamSource {
    /// Computed from configuration defaults.
    Default,
    /// Read verbatim from the override file.
    Override,
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Default => write!(f, "default"),
            ParamSource::Override => write!(f, "override"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerParams {
    pub config: PathBuf,
    pub port: u16,
    pub freezecheck: bool,
    pub be_path: PathBuf,
    pub profiles: PathBuf,
    pub logs: bool,
    pub admin_log: bool,
    pub net_log: bool,
    pub extra_params: Vec<String>,
}

impl ServerParams {
    pub fn from_config(paths: &PathsConfig, server: &ServerConfig) -> Self {
        Self {
            config: paths.server_cfg(),
            port: server.port,
            freezecheck: server.freezecheck,
            be_path: paths.battleye_dir(),
            profiles: paths.profiles_dir.clone(),
            logs: server.logs,
            admin_log: server.admin_log,
            net_log: server.net_log,
            extra_params: server.extra_params.clone(),
        }
    }

    pub fn to_command_string(&self) -> String {
        let mut parts = vec![
            format!("-config={}", self.config.display()),
            format!("-port={}", self.port),
        ];

        if self.freezecheck {
            parts.push("-freezecheck".to_string());
        }

        parts.push(format!("-BEpath={}", self.be_path.display()));
        parts.push(format!("-profiles={}", self.profiles.display()));
        parts.push(if self.logs { "-dologs" } else { "-nologs" }.to_string());

        if self.admin_log {
            parts.push("-adminlog".to_string());
        }

        if self.net_log {
            parts.push("-netlog".to_string());
        }

        parts.extend(self.extra_params.iter().cloned());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_string() {
        let params = ServerParams::from_config(&PathsConfig::default(), &ServerConfig::default());
        assert_eq!(
            params.to_command_string(),
            "-config=/profiles/serverDZ.cfg -port=2302 -freezecheck -BEpath=/profiles/battleye -profiles=/profiles -nologs"
        );
    }

    #[test]
    fn test_optional_flags_and_extras() {
        let server = ServerConfig {
            port: 2402,
            freezecheck: false,
            logs: true,
            admin_log: true,
            net_log: true,
            extra_params: vec!["-limitFPS=60".to_string()],
        };
        let line = ServerParams::from_config(&PathsConfig::default(), &server).to_command_string();
        assert!(line.contains("-port=2402"));
        assert!(!line.contains("-freezecheck"));
        assert!(line.contains("-dologs -adminlog -netlog -limitFPS=60"));
        assert!(line.ends_with("-limitFPS=60"));
    }
}
