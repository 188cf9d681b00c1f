use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::classify::{classify_dataset, group_dataset};
use crate::config::load_config;
use crate::datasets;
use crate::encode::encode_model;
use crate::model::{ModelInput, build_model};
use crate::parser::parse_csv;
use crate::render::{render_svg, write_output_svg};
use crate::solver::{SolveStatus, solve_model};

#[derive(Parser, Debug)]
#[command(
    name = "rectr",
    version,
    about = "Euler-style set diagram layout via mixed-integer programming"
)]
pub struct Args {
    /// Input CSV (one column per label) or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "dataset")]
    pub input: Option<PathBuf>,

    /// Built-in sample dataset (simpsons, potter, vitamins, venn4)
    #[arg(short = 'd', long = "dataset")]
    pub dataset: Option<String>,

    /// Output file. Defaults to stdout for svg/lp if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, toggles, solver overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    /// Write the encoded solver model instead of solving it
    Lp,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let csv = read_input(args.input.as_deref(), args.dataset.as_deref())?;
    let data = parse_csv(&csv)?;
    let classified = classify_dataset(&group_dataset(&data))?;

    let input = ModelInput::from_classified(&classified, &config.theme, config.settings.clone());
    let model = build_model(&classified, &input)?;

    if let OutputFormat::Lp = args.output_format {
        let mut text = encode_model(&model);
        text.push('\n');
        match args.output.as_deref() {
            Some(path) => std::fs::write(path, text)?,
            None => print!("{text}"),
        }
        return Ok(());
    }

    let solution = solve_model(&model, &config.solver);
    if solution.status != SolveStatus::Optimal {
        if let Some(diagnostics) = &solution.diagnostics {
            eprintln!("solver failure: {diagnostics}");
        }
        anyhow::bail!(
            "no optimal layout found ({:?}); retry with a smaller dataset or fewer enabled constraint families",
            solution.status
        );
    }

    let svg = render_svg(&classified, &solution, &config.theme, &config.render)?;
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
        #[cfg(feature = "png")]
        OutputFormat::Png => {
            let output = args
                .output
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            crate::render::write_output_png(&svg, output, &config.theme)
        }
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => Err(anyhow::anyhow!(
            "png support not compiled in; rebuild with the 'png' feature"
        )),
        OutputFormat::Lp => unreachable!("handled before solving"),
    }
}

fn read_input(path: Option<&Path>, dataset: Option<&str>) -> Result<String> {
    if let Some(name) = dataset {
        let Some(sample) = datasets::sample(name) else {
            anyhow::bail!(
                "unknown dataset {name:?}; available: {}",
                datasets::sample_names().join(", ")
            );
        };
        return Ok(sample.csv.to_string());
    }

    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
