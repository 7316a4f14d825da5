//! Template materialization and environment isolation with a real git.

#[macro_use]
mod support;

use std::path::{Path, PathBuf};

use copier_fixture::{CommandLine, FixtureError, FixtureResult, RunOptions, TemplateSession};
use copier_fixture_adapters::ProcessRunner;
use copier_fixture_core::application::{ApplicationError, ports::CommandRunner};

fn git(session: &TemplateSession, args: &[&str]) -> String {
    ProcessRunner::new()
        .run(
            &CommandLine::new("git").args(args.iter().copied()),
            session.template().path(),
            &RunOptions::new().with_env(session.env().clone()),
        )
        .unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn template_is_committed_and_tagged() -> FixtureResult<()> {
    require_tools!("git");
    let session = TemplateSession::start(support::config())?;

    assert_eq!(git(&session, &["tag", "--list"]), "99.99.99\n");
    assert_eq!(git(&session, &["log", "-1", "--format=%s"]), "test\n");
    assert_eq!(git(&session, &["status", "--porcelain"]), "");
    assert!(session.template().path().join("copier.yml").is_file());
    Ok(())
}

#[test]
fn materializing_twice_gives_equivalent_templates() -> FixtureResult<()> {
    require_tools!("git");
    let first = TemplateSession::start(support::config())?;
    let second = TemplateSession::start(support::config())?;

    assert_ne!(first.template().path(), second.template().path());
    for args in [&["tag", "--list"][..], &["log", "--format=%s"][..]] {
        assert_eq!(git(&first, args), git(&second, args));
    }
    assert_eq!(
        std::fs::read_to_string(first.template().path().join("copier.yml")).unwrap(),
        std::fs::read_to_string(second.template().path().join("copier.yml")).unwrap()
    );
    Ok(())
}

#[test]
fn subset_copies_only_listed_paths() -> FixtureResult<()> {
    require_tools!("git");
    let mut config = support::config();
    config.template.paths = vec![PathBuf::from("copier.yml"), PathBuf::from("README.md.jinja")];

    let session = TemplateSession::start(config)?;
    let root = session.template().path();

    assert!(session.template().is_subset());
    assert!(root.join("copier.yml").is_file());
    assert!(root.join("README.md.jinja").is_file());
    assert!(!root.join("{{ _copier_conf.answers_file }}.jinja").exists());
    Ok(())
}

#[test]
fn missing_subset_path_fails_the_session() -> FixtureResult<()> {
    require_tools!("git");
    let mut config = support::config();
    config.template.paths = vec![PathBuf::from("does-not-exist.txt")];

    let err = TemplateSession::start(config).err().expect("session must fail");
    let FixtureError::Application(ApplicationError::FilesystemError { path, .. }) = err else {
        panic!("expected a filesystem error, got {err:?}");
    };
    assert!(path.ends_with("does-not-exist.txt"));
    Ok(())
}

#[test]
fn git_is_isolated_from_the_user() -> FixtureResult<()> {
    require_tools!("git");
    let session = TemplateSession::start(support::config())?;
    let env = session.env();

    assert_eq!(
        env.get("GIT_CONFIG_GLOBAL").map(Path::new),
        Some(session.gitconfig().path())
    );
    assert!(
        env.iter()
            .all(|(key, _)| !key.starts_with("GIT_") || key == "GIT_CONFIG_GLOBAL")
    );
    assert_eq!(git(&session, &["config", "--global", "user.name"]), "Copier Fixture\n");
    assert_eq!(git(&session, &["config", "--global", "core.autocrlf"]), "input\n");
    assert!(session.gitconfig().path().starts_with(session.workspace()));
    Ok(())
}

#[test]
fn shared_session_is_built_once() -> FixtureResult<()> {
    require_tools!("git");
    let first = TemplateSession::shared()?;
    let second = TemplateSession::shared()?;

    assert!(std::ptr::eq(first, second));
    assert_eq!(first.template(), copier_fixture::copier()?.template());
    Ok(())
}
