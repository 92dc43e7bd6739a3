use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use treadle::bundle;
use treadle::context::MappingContext;
use treadle::processor::LayeredMappingsProcessor;
use treadle::spec::LayeredMappingSpec;

#[derive(Debug, Parser)]
#[command(name = "treadle", about = "Builds layered mapping bundles")]
struct Cli {
	/// Log debug output as well.
	#[arg(long, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Resolves a layered mapping spec and writes the bundle zip.
	BuildMappings {
		#[arg(long)]
		minecraft_version: String,
		/// Where downloaded artifacts are kept between runs.
		#[arg(long)]
		working_dir: PathBuf,
		/// The bundle zip to write.
		#[arg(long)]
		output: PathBuf,
		/// The published intermediary mappings, a bare tiny file or a jar.
		#[arg(long)]
		intermediary_url: String,
		#[arg(long)]
		client_mappings_url: Option<String>,
		#[arg(long)]
		server_mappings_url: Option<String>,
		/// Layer the official Mojang mappings (requires both mappings urls).
		#[arg(long)]
		mojang: bool,
		/// Layer a parchment export (zip or bare json).
		#[arg(long)]
		parchment: Option<PathBuf>,
		/// Keep the `p` prefix on parchment parameter names.
		#[arg(long)]
		parchment_keep_prefix: bool,
		/// Layer a custom tiny mappings file; repeatable, later files win.
		#[arg(long)]
		file: Vec<PathBuf>,
		/// Layer record signature fixes from a zip.
		#[arg(long)]
		signature_fix: Option<PathBuf>,
		/// Layer unpick data from a zip.
		#[arg(long)]
		unpick: Option<PathBuf>,
		/// The targeted version has no published intermediary mappings; synthesize
		/// the intermediary namespace from the named one.
		#[arg(long)]
		no_intermediate_mappings: bool,
		/// Re-download artifacts even when already present in the working directory.
		#[arg(long)]
		refresh_deps: bool,
	},
}

fn setup_logger(verbose: bool) -> Result<()> {
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message));
		})
		.level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up the logger")
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_logger(cli.verbose)?;

	match cli.command {
		Command::BuildMappings {
			minecraft_version, working_dir, output,
			intermediary_url, client_mappings_url, server_mappings_url,
			mojang, parchment, parchment_keep_prefix, file, signature_fix, unpick,
			no_intermediate_mappings, refresh_deps,
		} => {
			let mut builder = LayeredMappingSpec::builder();
			if mojang {
				builder = builder.official_mojang();
			}
			if let Some(path) = parchment {
				builder = builder.parchment(path, !parchment_keep_prefix);
			}
			for path in file {
				builder = builder.file(path);
			}
			if let Some(path) = signature_fix {
				builder = builder.signature_fix(path);
			}
			if let Some(path) = unpick {
				builder = builder.unpick(path);
			}
			let spec = builder.build();

			log::info!("building mapping bundle {} for minecraft {}", spec.version(), minecraft_version);

			let mut context = MappingContext::new(working_dir, minecraft_version, intermediary_url);
			context.client_mappings_url = client_mappings_url;
			context.server_mappings_url = server_mappings_url;
			context.refresh_deps = refresh_deps;

			let processor = LayeredMappingsProcessor::new(spec, no_intermediate_mappings);
			let layers = processor.resolve_layers(&context).await?;
			let tree = processor.get_mappings(&layers)?;
			let signature_fixes = processor.get_signature_fixes(&layers);
			let unpick_data = processor.get_unpick_data(&layers)?;

			bundle::write_bundle(&tree, signature_fixes.as_ref(), unpick_data, &output)?;
			log::info!("wrote mapping bundle to {output:?}");
			Ok(())
		},
	}
}
