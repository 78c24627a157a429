use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

const PLAYERS: &str = "Ann:Colonel Mustard,Bob:Professor Plum,Cid:Mrs. White";

fn asset(name: &str) -> String {
    format!("{}/assets/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cluedo"))
        .args(args)
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("cluedo binary starts");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("script is written");
    child.wait_with_output().expect("cluedo binary finishes")
}

#[test]
fn scripted_opening_plays_through() {
    let output = Command::new(env!("CARGO_BIN_EXE_cluedo"))
        .args([
            "--players",
            PLAYERS,
            "--seed",
            "3",
            "--content",
            &asset("classic.toml"),
            "--script",
            &asset("opening.script"),
        ])
        .env("RUST_LOG", "warn")
        .output()
        .expect("cluedo binary runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ann rolled 6"));
    assert!(stdout.contains("Ann suggests Professor Plum with the Rope in the Lounge"));
    assert!(stdout.contains("nobody could disprove the suggestion") || stdout.contains("can disprove with"));
    assert!(stdout.contains("Bob to play"));
    assert!(stdout.contains("Cid to play"));
}

#[test]
fn same_seed_same_transcript() {
    let script = "roll\nmove 3 17\nstatus\nfinish\nroll\nstatus\n";
    let first = run_with_stdin(&["--players", PLAYERS, "--seed", "11"], script);
    let second = run_with_stdin(&["--players", PLAYERS, "--seed", "11"], script);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn too_few_players_fail_to_start() {
    let output = run_with_stdin(&["--players", "Ann:Colonel Mustard,Bob:Professor Plum"], "");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to seat players"));
}

#[test]
fn revealing_an_unsuggested_card_aborts_the_session() {
    let output = run_with_stdin(
        &["--players", PLAYERS],
        "roll 1\nmove 1 17\nsuggest Mrs. White | Rope | Kitchen\nreveal Dagger\nstatus\n",
    );
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ann suggests Mrs. White with the Rope in the Kitchen"));
    assert!(!stdout.contains("status:"));
}
