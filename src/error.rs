/// Repository-wide structured errors for deployment operations.
#[derive(Debug, Clone)]
pub enum DeployError {
    /// 远端路径不符合绝对路径形态（Windows 盘符或 POSIX 绝对路径）
    InvalidRemotePath(String),
    /// 无法解析远端地址
    NoAddress(String),
    /// TCP 连接失败
    ConnectFailed(String, String),
    /// 无法创建 SSH Session
    SessionCreateFailed(String),
    /// SSH 握手失败
    HandshakeFailed(String),
    /// SSH 认证失败
    AuthFailed(String),
    /// 认证配置无效：password 与 privateKeyPath 必须二选一
    AuthConfigInvalid(String),
    /// SFTP 子系统创建失败
    SftpCreateFailed(String),
    /// 远端命令执行失败，保留命令与原始错误消息
    RemoteCommandFailed(String, String),
    /// 创建远端目录失败
    CreateRemoteDirFailed(String, String),
    /// 本地文件/目录读取失败
    LocalReadFailed(String, String),
    /// 远端目录枚举失败
    RemoteReadFailed(String, String),
    /// 配置文件读取失败
    ConfigRead(String, String),
    /// 配置文件解析失败
    ConfigParse(String, String),
    /// 本地压缩失败
    CompressFailed(String, String),
}

impl std::fmt::Display for DeployError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use DeployError::*;
        match self {
            InvalidRemotePath(p) => write!(f, "{} 不是一个合法的路径", p),
            NoAddress(addr) => write!(f, "无法解析地址: {}", addr),
            ConnectFailed(addr, msg) => write!(f, "连接服务器失败: {} — {}", addr, msg),
            SessionCreateFailed(addr) => write!(f, "无法创建 SSH Session: {}", addr),
            HandshakeFailed(addr) => write!(f, "SSH 握手失败: {}", addr),
            AuthFailed(addr) => write!(f, "SSH 认证失败: {}", addr),
            AuthConfigInvalid(app) => {
                write!(f, "目标 '{}' 的认证配置无效：password 与 privateKeyPath 必须恰好填写一个", app)
            }
            SftpCreateFailed(msg) => write!(f, "SFTP 创建失败: {}", msg),
            RemoteCommandFailed(cmd, msg) => write!(f, "远端命令执行失败: {} — {}", cmd, msg),
            CreateRemoteDirFailed(path, msg) => write!(f, "创建远端目录失败: {} — {}", path, msg),
            LocalReadFailed(path, msg) => write!(f, "本地读取失败: {} — {}", path, msg),
            RemoteReadFailed(path, msg) => write!(f, "远端目录枚举失败: {} — {}", path, msg),
            ConfigRead(path, msg) => write!(f, "读取配置文件失败: {} — {}", path, msg),
            ConfigParse(path, msg) => write!(f, "解析配置文件失败: {} — {}", path, msg),
            CompressFailed(path, msg) => write!(f, "本地压缩失败: {} — {}", path, msg),
        }
    }
}

impl std::error::Error for DeployError {}

impl DeployError {
    /// Whether this error aborts the whole run. Path/connection/config errors
    /// are fatal; a failed remote backup command or local compression is
    /// logged and the run continues. Per-item transfer failures never surface
    /// here at all — they are captured as `TaskOutcome` data.
    pub fn is_fatal(&self) -> bool {
        use DeployError::*;
        match self {
            InvalidRemotePath(_)
            | NoAddress(_)
            | ConnectFailed(_, _)
            | SessionCreateFailed(_)
            | HandshakeFailed(_)
            | AuthFailed(_)
            | AuthConfigInvalid(_)
            | SftpCreateFailed(_)
            | ConfigRead(_, _)
            | ConfigParse(_, _) => true,
            RemoteCommandFailed(_, _) | CompressFailed(_, _) => false,
            CreateRemoteDirFailed(_, _) | LocalReadFailed(_, _) | RemoteReadFailed(_, _) => false,
        }
    }
}
