use std::fs::File;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::config::ServerOptions;
use crate::error::DeployError;

// Buffer size for single-file SFTP writes; large enough to dominate
// per-call round-trip latency on typical build artifacts.
const PUT_BUF_SIZE: usize = 128 * 1024;

/// One entry of a remote directory listing.
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Result of one remote command execution. Output streams are drained into a
/// single buffer; callers only branch on the exit code.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output: String,
}

/// Trait abstracting the remote file operations used by the deployment
/// engine. Implementors must be Send + Sync so chunked tasks can share one
/// handle across scoped threads. Errors are plain strings — per-item failures
/// are data, not faults.
pub trait RemoteFs: Send + Sync {
    fn stat_is_dir(&self, path: &str) -> Result<bool, String>;
    fn exists(&self, path: &str) -> bool;
    fn mkdir(&self, path: &str) -> Result<(), String>;
    fn readdir(&self, path: &str) -> Result<Vec<RemoteEntry>, String>;
    fn unlink(&self, path: &str) -> Result<(), String>;
    fn rmdir(&self, path: &str) -> Result<(), String>;
    fn put_file(&self, local: &Path, remote: &str) -> Result<(), String>;
    /// 会话存活探测；整块任务全部失败时由执行器调用。
    fn alive(&self) -> bool;
}

/// Transport session held by the coordinator for the lifetime of one run:
/// remote file subsystem plus remote command execution plus teardown.
pub trait Transport {
    fn fs(&self) -> &dyn RemoteFs;
    fn execute(&self, command: &str) -> Result<CommandOutput, DeployError>;
    fn close(&self);
}

/// Adapter that owns an `ssh2::Sftp` and implements `RemoteFs`. The handle
/// sits behind a mutex: chunked tasks interleave their operations on the one
/// multiplexed SFTP channel instead of running truly parallel.
pub struct Ssh2RemoteFs {
    sftp: Mutex<ssh2::Sftp>,
}

impl Ssh2RemoteFs {
    pub fn new(sftp: ssh2::Sftp) -> Self {
        Self { sftp: Mutex::new(sftp) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ssh2::Sftp>, String> {
        self.sftp.lock().map_err(|_| "SFTP 互斥锁中毒".to_string())
    }
}

impl RemoteFs for Ssh2RemoteFs {
    fn stat_is_dir(&self, path: &str) -> Result<bool, String> {
        let sftp = self.lock()?;
        match sftp.stat(Path::new(path)) {
            Ok(st) => Ok(st.is_dir()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.lock().map(|sftp| sftp.stat(Path::new(path)).is_ok()).unwrap_or(false)
    }

    fn mkdir(&self, path: &str) -> Result<(), String> {
        let sftp = self.lock()?;
        sftp.mkdir(Path::new(path), 0o755).map_err(|e| e.to_string())
    }

    fn readdir(&self, path: &str) -> Result<Vec<RemoteEntry>, String> {
        let sftp = self.lock()?;
        let entries = sftp.readdir(Path::new(path)).map_err(|e| e.to_string())?;
        Ok(entries
            .into_iter()
            .filter_map(|(pathbuf, stat)| {
                let name = pathbuf.file_name()?.to_str()?.to_string();
                if matches!(name.as_str(), "." | "..") {
                    return None;
                }
                Some(RemoteEntry { name, is_dir: stat.is_dir(), size: stat.size.unwrap_or(0) })
            })
            .collect())
    }

    fn unlink(&self, path: &str) -> Result<(), String> {
        let sftp = self.lock()?;
        sftp.unlink(Path::new(path)).map_err(|e| e.to_string())
    }

    fn rmdir(&self, path: &str) -> Result<(), String> {
        let sftp = self.lock()?;
        sftp.rmdir(Path::new(path)).map_err(|e| e.to_string())
    }

    fn put_file(&self, local: &Path, remote: &str) -> Result<(), String> {
        let mut local_file =
            File::open(local).map_err(|e| format!("本地打开失败: {} — {}", local.display(), e))?;
        let sftp = self.lock()?;
        let mut remote_file = sftp
            .create(Path::new(remote))
            .map_err(|e| format!("远端创建文件失败: {} — {}", remote, e))?;
        let mut buf = vec![0u8; PUT_BUF_SIZE];
        loop {
            match local_file.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => remote_file
                    .write_all(&buf[..n])
                    .map_err(|e| format!("远端写入失败: {} — {}", remote, e))?,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(format!("本地读取失败: {} — {}", local.display(), e));
                }
            }
        }
        Ok(())
    }

    fn alive(&self) -> bool {
        // 探测根目录；'/' 在远端恒存在，stat 失败即视为会话丢失
        self.lock().map(|sftp| sftp.stat(Path::new("/")).is_ok()).unwrap_or(false)
    }
}

/// The one ssh2-backed transport session per deployment run.
pub struct SshTransport {
    sess: ssh2::Session,
    fs: Ssh2RemoteFs,
}

impl Transport for SshTransport {
    fn fs(&self) -> &dyn RemoteFs {
        &self.fs
    }

    fn execute(&self, command: &str) -> Result<CommandOutput, DeployError> {
        let mut channel = self
            .sess
            .channel_session()
            .map_err(|e| DeployError::RemoteCommandFailed(command.to_string(), e.to_string()))?;
        channel
            .exec(command)
            .map_err(|e| DeployError::RemoteCommandFailed(command.to_string(), e.to_string()))?;
        // stdout 与 stderr 合并收集；语义上只关心退出码
        let mut output = String::new();
        channel.read_to_string(&mut output).ok();
        channel.stderr().read_to_string(&mut output).ok();
        channel.wait_close().ok();
        let exit_code = channel.exit_status().unwrap_or(-1);
        Ok(CommandOutput { exit_code, output })
    }

    fn close(&self) {
        let _ = self.sess.disconnect(None, "deploy finished", None);
    }
}

/// 创建并配置 TCP 连接
fn create_tcp_connection(addr: &str) -> Result<TcpStream, DeployError> {
    let mut addrs =
        addr.to_socket_addrs().map_err(|_| DeployError::NoAddress(addr.to_string()))?;
    let sock = addrs.next().ok_or_else(|| DeployError::NoAddress(addr.to_string()))?;
    let tcp = TcpStream::connect_timeout(&sock, Duration::from_secs(10))
        .map_err(|e| DeployError::ConnectFailed(addr.to_string(), e.to_string()))?;
    let _ = tcp.set_read_timeout(Some(Duration::from_secs(30)));
    let _ = tcp.set_write_timeout(Some(Duration::from_secs(30)));
    Ok(tcp)
}

/// 按配置完成认证：password 与 privateKeyPath 必须恰好填写一个。
fn authenticate(
    sess: &ssh2::Session,
    server: &ServerOptions,
    label: &str,
    addr: &str,
) -> Result<(), DeployError> {
    match (&server.password, &server.private_key_path) {
        (Some(password), None) => {
            sess.userauth_password(&server.username, password)
                .map_err(|_| DeployError::AuthFailed(addr.to_string()))?;
        }
        (None, Some(key_path)) => {
            // 空字符串口令视为未设置（配置模板默认留空）
            let passphrase = server.passphrase.as_deref().filter(|p| !p.is_empty());
            sess.userauth_pubkey_file(&server.username, None, key_path, passphrase)
                .map_err(|_| DeployError::AuthFailed(addr.to_string()))?;
        }
        _ => return Err(DeployError::AuthConfigInvalid(label.to_string())),
    }
    if sess.authenticated() { Ok(()) } else { Err(DeployError::AuthFailed(addr.to_string())) }
}

/// Connect, handshake and authenticate one session for a deployment run.
pub fn connect(server: &ServerOptions, label: &str) -> Result<SshTransport, DeployError> {
    let addr = format!("{}:{}", server.host, server.port);
    let tcp = create_tcp_connection(&addr)?;
    let mut sess =
        ssh2::Session::new().map_err(|_| DeployError::SessionCreateFailed(addr.clone()))?;
    sess.set_tcp_stream(tcp);
    sess.handshake().map_err(|_| DeployError::HandshakeFailed(addr.clone()))?;
    authenticate(&sess, server, label, &addr)?;
    let sftp = sess.sftp().map_err(|e| DeployError::SftpCreateFailed(e.to_string()))?;
    tracing::debug!("SSH 会话已建立: {}", addr);
    Ok(SshTransport { sess, fs: Ssh2RemoteFs::new(sftp) })
}
