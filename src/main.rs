use anyhow::{Context, anyhow};

use petri_codegen::codegen::{self, write_artifacts};
use petri_codegen::config::PncConfig;
use petri_codegen::net::{diagnostics, io};
use petri_codegen::options::Options;

fn main() {
    let e = env_logger::Env::new()
        .filter_or("PNC_LOG", "warn")
        .write_style("PNC_LOG_STYLE");
    env_logger::init_from_env(e);

    let options = match parse_options() {
        Ok(Ok(options)) => options,
        Ok(Err(err)) => err.exit(),
        Err(err) => {
            eprintln!("pnc: error: {err:#}");
            std::process::exit(1);
        }
    };
    log::debug!("pnc options: {:?}", options);

    let exit_code = match run(&options) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("pnc: error: {err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// `PNC_FLAGS` go first so that the actual command line overrides them.
fn parse_options() -> anyhow::Result<Result<Options, clap::Error>> {
    let env_flags = std::env::var("PNC_FLAGS").unwrap_or_default();
    let mut flags = shellwords::split(&env_flags)
        .map_err(|err| anyhow!("{err:?} in PNC_FLAGS `{env_flags}`"))?;

    for (i, arg) in std::env::args_os().enumerate().skip(1) {
        let arg = arg
            .into_string()
            .map_err(|arg| anyhow!("argument {i} is not valid Unicode: {arg:?}"))?;
        flags.push(arg);
    }
    Ok(Options::parse_from_args(&flags))
}

fn run(options: &Options) -> anyhow::Result<()> {
    let mut config = PncConfig::load_from_file(&options.config)?;
    options.apply_to(&mut config);

    let model = io::read_model(&options.input)
        .with_context(|| format!("failed to load net from {}", options.input.display()))?;

    if config.diagnostics {
        diagnostics::log_diagnostics(&model);
    }

    if let Some(path) = &options.dump_model {
        io::write_description(path, &model.to_description())
            .with_context(|| format!("failed to dump model to {}", path.display()))?;
        log::info!("dumped canonical model to {}", path.display());
    }

    let artifacts = codegen::generate(&model, &config.oracle_spec(), &config.emit_options())
        .with_context(|| format!("failed to compile net `{}`", model.name()))?;
    let written = write_artifacts(&artifacts, &options.output_dir)?;

    log::info!(
        "generated {} and {}",
        written.header.display(),
        written.source.display()
    );
    Ok(())
}
