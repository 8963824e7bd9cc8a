use crate::config::ParamConfig;
use crate::error::{Error, Result};
use crate::runner::{CommandRunner, Invocation};
use crate::settings::Settings;
use log::info;
use std::path::PathBuf;
use xshell::Shell;

/// Cross compiles every function and copies the binary to `<output dir>/<name>`.
///
/// Stops at the first function that fails to build; binaries already copied
/// stay where they are.
pub fn build(settings: &Settings, runner: &dyn CommandRunner) -> Result<()> {
    info!("Building...");

    let sh = Shell::new()?;
    sh.create_dir(settings.output_dir())?;

    for function in &settings.functions {
        info!("* {}", function.name);

        let manifest_path = function.manifest_path();
        let invocation = Invocation::new("cargo", &settings.root).args([
            "build".to_string(),
            "--release".to_string(),
            "--target".to_string(),
            settings.target.clone(),
            "--target-dir".to_string(),
            settings.target_dir.display().to_string(),
            "--manifest-path".to_string(),
            manifest_path.display().to_string(),
            "--bin".to_string(),
            function.name.clone(),
        ]);

        let output = runner.run(&invocation)?;
        if !output.is_success() {
            return Err(Error::Compilation {
                function: function.name.clone(),
                output: output.output,
            });
        }

        let artifact = settings.artifact_path(function);
        if !sh.path_exists(&artifact) {
            return Err(Error::Compilation {
                function: function.name.clone(),
                output: format!("cargo finished but {} is missing", artifact.display()),
            });
        }

        sh.copy_file(&artifact, settings.output_path(function))?;
    }

    Ok(())
}

/// Removes the output directory. Missing directories are fine.
pub fn clean(settings: &Settings) -> Result<()> {
    info!("Cleaning...");

    let sh = Shell::new()?;
    sh.remove_path(settings.output_dir())?;

    Ok(())
}

/// Uploads the build outputs and writes the generated template. Returns the
/// generated template path.
pub fn package(settings: &Settings, runner: &dyn CommandRunner) -> Result<PathBuf> {
    let config = ParamConfig::load(&settings.param_file())?;

    info!("Packaging...");

    let invocation = Invocation::new("aws", &settings.root).args([
        "cloudformation".to_string(),
        "package".to_string(),
        "--template-file".to_string(),
        settings.template_file.display().to_string(),
        "--s3-bucket".to_string(),
        config.code_s3_bucket,
        "--s3-prefix".to_string(),
        config.code_s3_prefix,
        "--output-template-file".to_string(),
        settings.output_template_file.display().to_string(),
    ]);

    run_checked(runner, invocation)?;

    info!(
        "Generated template file: {}",
        settings.output_template_file.display()
    );

    Ok(settings.output_template_file.clone())
}

/// Deploys the generated template. The parameter file is read again here
/// rather than reusing what `package` loaded.
pub fn deploy(settings: &Settings, runner: &dyn CommandRunner) -> Result<()> {
    let config = ParamConfig::load(&settings.param_file())?;

    info!("Deploy...");

    let invocation = Invocation::new("aws", &settings.root)
        .args([
            "cloudformation".to_string(),
            "deploy".to_string(),
            "--template-file".to_string(),
            settings.output_template_file.display().to_string(),
            "--stack-name".to_string(),
            config.stack_name,
            "--capabilities".to_string(),
            settings.capabilities.clone(),
            "--parameter-overrides".to_string(),
        ])
        .args(config.parameters);

    run_checked(runner, invocation)?;

    info!("Done!");

    Ok(())
}

fn run_checked(runner: &dyn CommandRunner, invocation: Invocation) -> Result<String> {
    let output = runner.run(&invocation)?;
    if output.is_success() {
        return Ok(output.output);
    }

    Err(Error::ExternalCommand {
        program: invocation.program,
        args: invocation.args,
        code: output.code,
        output: output.output,
    })
}
