//! Module for the "hydrate" functionality.

use super::*;

/// Arguments that can be used for the [`Commands::Hydrate`]
#[derive(Args, Clone)]
pub struct HydrateArgs {
  /// Where the document lives at its source
  pub url: String,

  /// Source tag, inferred from the URL host when omitted
  #[arg(long, short)]
  pub source: Option<String>,

  /// Identifier, derived from the URL when omitted
  #[arg(long)]
  pub id: Option<String>,

  /// License tag, resolved from the source when omitted
  #[arg(long)]
  pub license: Option<String>,

  /// Never touch the network
  #[arg(long)]
  pub offline: bool,

  /// Directory or file to search before downloading
  #[arg(long)]
  pub local_dir: Option<PathBuf>,

  /// Also fetch title and abstract from the source
  #[arg(long)]
  pub metadata: bool,
}

/// Builds the descriptor the arguments describe.
fn describe(handler: &DocumentHandler, args: &HydrateArgs) -> Result<Document> {
  let source = match &args.source {
    Some(source) => source.clone(),
    None => handler.registry().infer_source_from_url(&args.url)?,
  };
  let id = match &args.id {
    Some(id) => id.clone(),
    None => handler.registry().id_from_url(Some(source.as_str()), &args.url)?,
  };

  let doc = Document::new(id, &args.url, &source);
  Ok(match &args.license {
    Some(license) => doc.with_license(license),
    None => doc,
  })
}

/// Function for the [`Commands::Hydrate`] in the CLI.
pub async fn hydrate(cli: &Cli, args: HydrateArgs) -> Result<()> {
  let handler = open_handler(cli)?;
  let mut doc = describe(&handler, &args)?;

  println!(
    "{} Acquiring {} from {}",
    style(INFO_PREFIX).cyan(),
    style(&doc.id).yellow(),
    style(&doc.source).cyan()
  );

  let mut options = HydrateOptions::default().offline(args.offline);
  if let Some(local_dir) = &args.local_dir {
    options = options.with_local_dir(local_dir);
  }

  let path = if args.metadata {
    handler.process(&mut doc, &options).await?
  } else {
    handler.hydrate(&mut doc, &options).await?
  };
  handler.close()?;

  match (path, &doc.hash) {
    (Some(path), Some(hash)) => {
      println!("{} {}", style(SUCCESS_PREFIX).green(), style(path.display()).yellow());
      println!("   {} {}", style("License:").green().bold(), doc.license);
      println!("   {} {}", style("Hash:").green().bold(), hash);
      if let Some(title) = &doc.title {
        println!("   {} {}", style("Title:").green().bold(), title);
      }
    },
    _ => println!(
      "{} No local copy of {} and offline, nothing acquired",
      style(WARNING_PREFIX).yellow(),
      style(&doc.id).yellow()
    ),
  }
  Ok(())
}
