use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use release_pipeline::config;
use release_pipeline::exec::SystemRunner;
use release_pipeline::manifest;
use release_pipeline::pipeline::run_release;
use release_pipeline::settings::{ReleaseSettings, SettingsOverrides};
use release_pipeline::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-pipeline",
    version,
    about = "Check, test and version a release in one fixed, fail-fast sequence"
)]
struct Args {
    #[arg(
        value_name = "BUMP",
        help = "major, minor, patch, premajor, preminor, prepatch, prerelease or an explicit version; inferred from conventional commits when omitted"
    )]
    bump: Option<String>,

    #[arg(
        long,
        value_name = "TEMPLATE",
        help = "Commit message for the version bump; must contain %v or %s [default: chore(release): %v]"
    )]
    commit_message: Option<String>,

    #[arg(long, help = "Distribution tag used at publish time [default: latest]")]
    dist_tag: Option<String>,

    #[arg(long, help = "Branch releases are cut from [default: master]")]
    git_branch: Option<String>,

    #[arg(long, help = "Git remote to fetch from and push to [default: origin]")]
    git_remote: Option<String>,

    #[arg(
        long,
        help = "Prerelease identifier [default: derived from the current version]"
    )]
    preid: Option<String>,

    #[arg(long, help = "Package registry URL [default: from the manifest]")]
    registry: Option<String>,

    #[arg(long, overrides_with = "no_sign", help = "Sign the release commit and tag")]
    sign: bool,

    #[arg(
        long,
        overrides_with = "sign",
        help = "Do not sign, even when the config file enables signing"
    )]
    no_sign: bool,

    #[arg(long, help = "Publish and push after the version bump")]
    publish: bool,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, default_value = "package.json", help = "Project manifest path")]
    manifest: PathBuf,
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            version_bump: self.bump.clone(),
            commit_message: self.commit_message.clone(),
            dist_tag: self.dist_tag.clone(),
            git_branch: self.git_branch.clone(),
            git_remote: self.git_remote.clone(),
            preid: self.preid.clone(),
            registry: self.registry.clone(),
            sign: if self.no_sign {
                Some(false)
            } else {
                self.sign.then_some(true)
            },
            publish: self.publish.then_some(true),
        }
    }
}

fn resolve_settings(args: &Args) -> Result<ReleaseSettings> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let manifest = manifest::load_manifest(&args.manifest)?;
    let settings = ReleaseSettings::resolve(args.overrides(), &manifest, &config)
        .context("Invalid release settings")?;
    Ok(settings)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = match resolve_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ui::display_release_failed();
            process::exit(1);
        }
    };

    let outcome = run_release(&settings, SystemRunner::new());
    if !outcome.is_success() {
        process::exit(outcome.exit_code());
    }

    Ok(())
}
