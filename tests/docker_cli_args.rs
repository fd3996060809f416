// tests/docker_cli_args.rs

use std::collections::BTreeMap;

use dockergoal::client::docker_cli::{
    create_args, is_missing_image, is_missing_object, login_args, parse_inspect, remove_args,
};
use dockergoal::client::{ClientError, ContainerClient, DockerCli};
use dockergoal::types::{AuthConfig, ContainerConfig, HostConfig};

const INSPECT_RUNNING: &str = r#"[
  {
    "Id": "4f66ad9a0b2e",
    "Name": "/web",
    "Image": "sha256:0e5e1a2b",
    "State": { "Status": "running", "Running": true, "Pid": 4242 },
    "Config": { "Image": "nginx:1.27" }
  }
]"#;

#[test]
fn inspect_output_is_decoded() {
    let info = parse_inspect(INSPECT_RUNNING)
        .expect("valid json")
        .expect("one entry");

    assert_eq!(info.id, "4f66ad9a0b2e");
    assert_eq!(info.name, "web");
    assert_eq!(info.image, "sha256:0e5e1a2b");
    assert!(info.running);
}

#[test]
fn empty_inspect_output_means_absent() {
    assert!(parse_inspect("[]").unwrap().is_none());
}

#[test]
fn malformed_inspect_output_is_a_decode_error() {
    assert!(matches!(parse_inspect("not json"), Err(ClientError::Decode(_))));
}

#[test]
fn missing_objects_are_recognised() {
    assert!(is_missing_object("Error: No such container: web"));
    assert!(is_missing_object("Error: No such object: web"));
    assert!(is_missing_object("Error response from daemon: No such image: nginx:1.27"));
    assert!(is_missing_object("Error: no such container \"web\""));
    assert!(!is_missing_object("Cannot connect to the Docker daemon"));
}

#[test]
fn only_a_missing_image_triggers_a_pull() {
    assert!(is_missing_image("Unable to find image: No such image: nginx:1.27"));
    assert!(is_missing_image("Error response from daemon: no such image: app:1"));
    // A missing link target is also a not-found error, but pulling cannot fix it.
    assert!(is_missing_object("Error response from daemon: No such container: db"));
    assert!(!is_missing_image("Error response from daemon: No such container: db"));
    assert!(!is_missing_image("Error: No such object: data"));
}

#[test]
fn create_args_carry_config_and_host_settings() {
    let mut labels = BTreeMap::new();
    labels.insert("tier".to_string(), "front".to_string());
    let config = ContainerConfig {
        image: "nginx:1.27".into(),
        cmd: vec!["-g".into(), "daemon off;".into()],
        entrypoint: Some(vec!["nginx".into(), "-c".into(), "/etc/nginx.conf".into()]),
        env: vec!["MODE=prod".into()],
        labels,
        user: Some("www".into()),
        working_dir: Some("/srv".into()),
    };
    let host = HostConfig {
        links: vec!["db:database".into()],
        volumes_from: vec!["data:ro".into()],
        ports: vec!["8080:80".into()],
        binds: vec!["/srv/www:/usr/share/nginx/html:ro".into()],
        network_mode: Some("bridge".into()),
        restart_policy: Some("unless-stopped".into()),
    };

    let args = create_args("web", &config, &host);

    let expected: Vec<String> = [
        "create",
        "--name",
        "web",
        "--entrypoint",
        "nginx",
        "--env",
        "MODE=prod",
        "--label",
        "tier=front",
        "--user",
        "www",
        "--workdir",
        "/srv",
        "--link",
        "db:database",
        "--volumes-from",
        "data:ro",
        "--publish",
        "8080:80",
        "--volume",
        "/srv/www:/usr/share/nginx/html:ro",
        "--network",
        "bridge",
        "--restart",
        "unless-stopped",
        "nginx:1.27",
        "-c",
        "/etc/nginx.conf",
        "-g",
        "daemon off;",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(args, expected);
}

#[test]
fn minimal_create_args() {
    let args = create_args("db", &ContainerConfig::new("postgres:16"), &HostConfig::default());
    assert_eq!(args, vec!["create", "--name", "db", "postgres:16"]);
}

#[test]
fn remove_args_follow_flags() {
    assert_eq!(remove_args("abc", true, false), vec!["rm", "--force", "abc"]);
    assert_eq!(
        remove_args("abc", true, true),
        vec!["rm", "--force", "--volumes", "abc"]
    );
    assert_eq!(remove_args("abc", false, false), vec!["rm", "abc"]);
}

#[test]
fn login_args_never_contain_the_password() {
    let auth = AuthConfig {
        username: "bot".into(),
        password: "hunter2".into(),
        email: None,
        server_address: "registry.example.com".into(),
    };

    let args = login_args(&auth);

    assert_eq!(
        args,
        vec![
            "login",
            "--username",
            "bot",
            "--password-stdin",
            "registry.example.com"
        ]
    );
    assert!(!args.iter().any(|a| a.contains("hunter2")));
}

#[tokio::test]
async fn missing_docker_binary_surfaces_as_io_error() {
    let client = DockerCli::new("/nonexistent/dockergoal-test/docker");

    let err = client.inspect_container("web").await.unwrap_err();

    assert!(matches!(err, ClientError::Io(_)), "{err:?}");
    assert!(!err.is_not_found());
}
