//! `.env` handling. Kept in its own test binary since it changes the
//! working directory and process environment.

use clap::Parser;
use cloud_samples::cli::{Cli, Service};
use cloud_samples::config::load_dotenv;

#[test]
fn test_dotenv_project_reaches_cli() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "GOOGLE_CLOUD_PROJECT=from-dotenv\nGOOGLE_OAUTH_ACCESS_TOKEN=ya29.from-dotenv\n",
    )
    .unwrap();
    std::env::remove_var("GOOGLE_CLOUD_PROJECT");
    std::env::remove_var("GOOGLE_OAUTH_ACCESS_TOKEN");
    std::env::set_current_dir(dir.path()).unwrap();

    assert!(load_dotenv().is_some());

    let cli = Cli::try_parse_from(["cloud-samples", "monitoring", "list-uptime-checks"]).unwrap();
    assert_eq!(cli.access_token.as_deref(), Some("ya29.from-dotenv"));
    let Service::Monitoring(args) = cli.service else {
        panic!("expected monitoring");
    };
    assert_eq!(args.project_id, "from-dotenv");
}
