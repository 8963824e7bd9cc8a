use anyhow::{Context, Result};
use env_logger::Env;
use log::info;
use sam_deployer::{
    function::FunctionDescriptor,
    pipeline::{Pipeline, Stage},
    runner::ProcessRunner,
    settings::Settings,
};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "sam_deployer", about = "Build, package and deploy SAM lambdas")]
struct Opt {
    /// Operation to run: build, clean, package or deploy
    #[structopt(possible_values = &["build", "clean", "package", "deploy"], case_insensitive = true)]
    operation: Stage,

    /// Project directory; relative paths and commands are resolved from here
    #[structopt(long, default_value = ".", parse(from_os_str))]
    root: PathBuf,

    /// Parameter file, overrides CONFIG_FILE
    #[structopt(short, long, parse(from_os_str))]
    config_file: Option<PathBuf>,

    /// Function to build as <name>=<path>, may be repeated
    #[structopt(short, long = "function")]
    functions: Vec<FunctionDescriptor>,

    /// Directory the built binaries are copied to
    #[structopt(long, parse(from_os_str))]
    output_dir: Option<PathBuf>,

    /// Rust target triple to cross compile for
    #[structopt(long)]
    target: Option<String>,

    /// SAM template to package
    #[structopt(long, parse(from_os_str))]
    template_file: Option<PathBuf>,

    /// Where the packaged template is written
    #[structopt(long, parse(from_os_str))]
    output_template_file: Option<PathBuf>,
}

impl Opt {
    fn into_settings(self) -> Settings {
        let defaults = Settings::default();

        Settings {
            root: self.root,
            functions: if self.functions.is_empty() {
                defaults.functions
            } else {
                self.functions
            },
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            target: self.target.unwrap_or(defaults.target),
            template_file: self.template_file.unwrap_or(defaults.template_file),
            output_template_file: self
                .output_template_file
                .unwrap_or(defaults.output_template_file),
            config_file: self.config_file,
            ..defaults
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("sam_deployer=info")).init();

    let options = Opt::from_args();
    let operation = options.operation;
    let settings = options.into_settings();

    info!(
        "{operation}: {} function(s) from {}",
        settings.functions.len(),
        settings.root.display()
    );

    let mut pipeline = Pipeline::new(&settings, &ProcessRunner);

    if let Err(err) = pipeline.run(operation) {
        if let Some(output) = err.captured_output() {
            println!("Error: {}", output);
        }
        return Err(err).with_context(|| format!("{operation} failed"));
    }

    Ok(())
}
