use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DeployError;

pub const DEFAULT_CONFIG_FILE: &str = "deploy.json";

/// 单个部署目标；与磁盘上的 camelCase JSON 字段一一对应。
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeployTarget {
    pub app_name: String,
    pub environment: String,
    #[serde(default)]
    pub compress: bool,
    pub local_path: PathBuf,
    pub remote_path: String,
    pub server_options: ServerOptions,
}

impl DeployTarget {
    /// 选择列表里展示的标签，例如 `my-app (prod)`。
    pub fn label(&self) -> String {
        format!("{} ({})", self.app_name, self.environment)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServerOptions {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

fn default_port() -> u16 {
    22
}

/// Load deployment targets from a JSON config file. A file holding a single
/// target object (not wrapped in an array) is accepted as a one-element list.
pub fn load_targets(path: &Path) -> Result<Vec<DeployTarget>, DeployError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| DeployError::ConfigRead(display.clone(), e.to_string()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| DeployError::ConfigParse(display.clone(), e.to_string()))?;
    let targets = match value {
        serde_json::Value::Array(_) => serde_json::from_value::<Vec<DeployTarget>>(value)
            .map_err(|e| DeployError::ConfigParse(display.clone(), e.to_string()))?,
        serde_json::Value::Object(_) => vec![
            serde_json::from_value::<DeployTarget>(value)
                .map_err(|e| DeployError::ConfigParse(display.clone(), e.to_string()))?,
        ],
        _ => {
            return Err(DeployError::ConfigParse(
                display,
                "期望单个部署目标对象或目标数组".to_string(),
            ));
        }
    };
    Ok(targets)
}

/// Template written by the config wizard when no config file exists yet.
pub fn template() -> serde_json::Value {
    serde_json::json!([
        {
            "appName": "项目名称",
            "environment": "dev",
            "compress": true,
            "localPath": "./dist",
            "remotePath": "/var/www/html",
            "serverOptions": {
                "host": "192.168.2.222",
                "port": 22,
                "username": "root",
                "password": "服务器密码，密钥登陆的话删除此项",
                "privateKeyPath": "~/.ssh/id_rsa",
                "passphrase": ""
            }
        }
    ])
}

pub fn write_template(path: &Path) -> Result<(), DeployError> {
    let display = path.display().to_string();
    let content = serde_json::to_string_pretty(&template())
        .map_err(|e| DeployError::ConfigParse(display.clone(), e.to_string()))?;
    std::fs::write(path, content).map_err(|e| DeployError::ConfigRead(display, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE: &str = r#"{
        "appName": "site",
        "environment": "prod",
        "localPath": "./dist",
        "remotePath": "/var/www/site",
        "serverOptions": { "host": "10.0.0.2", "username": "deploy", "password": "s3cret" }
    }"#;

    #[test]
    fn single_object_config_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("deploy.json");
        std::fs::write(&p, SINGLE).unwrap();
        let targets = load_targets(&p).unwrap();
        assert_eq!(targets.len(), 1);
        let t = &targets[0];
        assert_eq!(t.app_name, "site");
        assert_eq!(t.environment, "prod");
        assert!(!t.compress);
        assert_eq!(t.remote_path, "/var/www/site");
        assert_eq!(t.server_options.port, 22);
        assert_eq!(t.server_options.password.as_deref(), Some("s3cret"));
        assert!(t.server_options.private_key_path.is_none());
    }

    #[test]
    fn array_config_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("deploy.json");
        std::fs::write(&p, format!("[{}, {}]", SINGLE, SINGLE)).unwrap();
        let targets = load_targets(&p).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].label(), "site (prod)");
    }

    #[test]
    fn scalar_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("deploy.json");
        std::fs::write(&p, "42").unwrap();
        assert!(load_targets(&p).is_err());
    }

    #[test]
    fn missing_file_is_config_read_error() {
        let err = load_targets(Path::new("/no/such/deploy.json")).unwrap_err();
        assert!(matches!(err, DeployError::ConfigRead(_, _)));
    }

    #[test]
    fn template_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("deploy.json");
        write_template(&p).unwrap();
        let targets = load_targets(&p).unwrap();
        assert_eq!(targets.len(), 1);
        assert!(targets[0].compress);
    }
}
