use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tsuzuki_lib::comparison::UnnumberedPolicy;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    pub unnumbered_policy: UnnumberedPolicy,
    #[serde(default = "default_carry_read_state")]
    pub carry_read_state: bool,
    #[serde(default)]
    pub keep_removed_read_chapters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: tsuzuki_home().join("config.yml"),
            unnumbered_policy: UnnumberedPolicy::default(),
            carry_read_state: default_carry_read_state(),
            keep_removed_read_chapters: false,
        }
    }
}

fn tsuzuki_home() -> PathBuf {
    match std::env::var("TSUZUKI_HOME") {
        Ok(path) => PathBuf::from(path),
        Err(_) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tsuzuki"),
    }
}

fn default_carry_read_state() -> bool {
    true
}

impl Config {
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Config, anyhow::Error> {
        let config_path = match path {
            Some(p) => PathBuf::new().join(p),
            None => tsuzuki_home().join("config.yml"),
        };

        match std::fs::File::open(&config_path) {
            Ok(file) => {
                info!("Open config from {:?}", config_path);
                let mut cfg: Self = serde_yml::from_reader(file)?;
                cfg.path = config_path;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Config {
                    path: config_path,
                    ..Default::default()
                };
                cfg.save()?;
                info!("Write default config at {:?}", cfg.path);
                Ok(cfg)
            }
        }
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_yml::to_string(&self)?)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
