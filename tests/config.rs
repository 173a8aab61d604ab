use ballista::DeployConfig;
use ballista::error::DeployError;

#[test]
fn defaults() {
    let config = DeployConfig::new("myapp", "https://example.com/repo.git", "198.51.100.7");

    assert_eq!(config.app_name, "myapp");
    assert_eq!(config.repo_url, "https://example.com/repo.git");
    assert_eq!(config.ssh_host, "198.51.100.7");
    assert_eq!(config.branch, "main");
    assert_eq!(config.token_var, "DEPLOY_TOKEN");
    assert_eq!(config.ssh_user, "root");
    assert_eq!(config.app_port, 3000);
    assert!(config.domain.is_none());
    assert_eq!(config.remote_dir, "/opt/myapp");
}

#[test]
fn builder_chain() {
    let config = DeployConfig::new("api", "https://example.com/api.git", "host.example.com")
        .branch("release")
        .token_var("API_DEPLOY_TOKEN")
        .ssh_user("deploy")
        .ssh_key("/tmp/key")
        .app_port(8080)
        .domain("api.example.com")
        .remote_dir("/srv/api");

    assert_eq!(config.branch, "release");
    assert_eq!(config.token_var, "API_DEPLOY_TOKEN");
    assert_eq!(config.ssh_user, "deploy");
    assert_eq!(config.ssh_key, "/tmp/key");
    assert_eq!(config.app_port, 8080);
    assert_eq!(config.domain.as_deref(), Some("api.example.com"));
    assert_eq!(config.remote_dir, "/srv/api");
}

#[test]
fn missing_credential_fails_validation() {
    let config = DeployConfig::new("a", "https://x/r.git", "h")
        .token_var("BALLISTA_IT_UNSET_TOKEN")
        .ssh_key("/nonexistent/key");

    // The credential check comes first: the key path is never
    // even looked at.
    let err = config.validate().unwrap_err();
    assert!(matches!(err, DeployError::EnvMissing(var) if var == "BALLISTA_IT_UNSET_TOKEN"));
}

#[test]
fn missing_key_fails_validation() {
    unsafe { std::env::set_var("BALLISTA_IT_TOKEN_A", "tok") };
    let config = DeployConfig::new("a", "https://x/r.git", "h")
        .token_var("BALLISTA_IT_TOKEN_A")
        .ssh_key("/nonexistent/key");

    let err = config.validate().unwrap_err();
    assert!(matches!(err, DeployError::Config(_)));
}

#[test]
#[cfg(unix)]
fn validate_rewrites_loose_key_to_600() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    unsafe { std::env::set_var("BALLISTA_IT_TOKEN_B", "tok") };

    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("id_test");
    fs::write(&key, "key material").unwrap();
    fs::set_permissions(&key, fs::Permissions::from_mode(0o644)).unwrap();

    let config = DeployConfig::new("a", "https://x/r.git", "h")
        .token_var("BALLISTA_IT_TOKEN_B")
        .ssh_key(key.to_str().unwrap());

    config.validate().unwrap();

    let mode = fs::metadata(&key).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}
