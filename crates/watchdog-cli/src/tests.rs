use watchdog_core::{Platform, Sentiment};

use super::*;

fn run_args(args: &[&str]) -> RunArgs {
    let mut argv = vec!["watchdog", "run"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("expected valid cli args");
    match cli.command {
        Commands::Run(args) => args,
        Commands::Config => panic!("expected run command"),
    }
}

#[test]
fn parses_config_command() {
    let cli = Cli::try_parse_from(["watchdog", "config"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Config));
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["watchdog"]).is_err());
}

#[test]
fn run_defaults_to_unfiltered_text_output() {
    let args = run_args(&["--topic", "dziura w drodze"]);
    assert_eq!(args.topic.as_deref(), Some("dziura w drodze"));
    assert!(args.location.is_none());
    assert!(args.image.is_none());
    assert!(!args.json);
    assert_eq!(args.post_filter(), PostFilter::default());
}

#[test]
fn run_parses_filters() {
    let args = run_args(&[
        "--topic",
        "dziura",
        "--location",
        "Kraków",
        "--platform",
        "twitter",
        "--sentiment",
        "negative",
        "--json",
    ]);
    assert_eq!(args.location.as_deref(), Some("Kraków"));
    assert!(args.json);
    assert_eq!(
        args.post_filter(),
        PostFilter {
            platform: PlatformFilter::Only(Platform::Twitter),
            sentiment: SentimentFilter::Only(Sentiment::Negative),
        }
    );
}

#[test]
fn run_rejects_unknown_platform() {
    let result = Cli::try_parse_from(["watchdog", "run", "--topic", "x", "--platform", "myspace"]);
    assert!(result.is_err());
}

#[test]
fn run_accepts_image_without_topic() {
    let args = run_args(&["--image", "photo.jpg"]);
    assert!(args.topic.is_none());
    assert_eq!(args.image, Some(PathBuf::from("photo.jpg")));
}

#[test]
fn coordinates_require_both_axes() {
    assert!(Cli::try_parse_from(["watchdog", "run", "--topic", "x", "--lat", "50.06"]).is_err());

    let args = run_args(&["--topic", "x", "--lat", "50.06", "--lon", "-19.94"]);
    assert_eq!(args.lat, Some(50.06));
    assert_eq!(args.lon, Some(-19.94));
}
