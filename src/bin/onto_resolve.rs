use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_onto_resolver::client::OntologyClient;
use kira_onto_resolver::config::ConfigLoader;
use kira_onto_resolver::discovery::{DiscoveryOptions, TermDiscoverer};
use kira_onto_resolver::domain::Relation;
use kira_onto_resolver::error::OntoError;
use kira_onto_resolver::output::JsonOutput;
use kira_onto_resolver::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "onto-resolve")]
#[command(about = "Resolve ontology terms, hierarchies and mappings against a BioPortal-style service")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show ontology metadata and its class URI prefix")]
    Ontology(OntologyArgs),
    #[command(about = "Fetch a term by accession or URI")]
    Term(TermArgs),
    #[command(about = "List direct children of a term")]
    Children(TermArgs),
    #[command(about = "List all descendants of a term")]
    Descendants(TermArgs),
    #[command(about = "List direct parents of a term")]
    Parents(TermArgs),
    #[command(about = "List all ancestors of a term")]
    Ancestors(TermArgs),
    #[command(about = "List mappings of a term to other ontologies")]
    Mappings(MappingsArgs),
    #[command(about = "Annotate free text with ontology terms")]
    Annotate(AnnotateArgs),
    #[command(about = "Discover terms for a value label")]
    Discover(DiscoverArgs),
}

#[derive(Args)]
struct OntologyArgs {
    acronym: String,
}

#[derive(Args)]
struct TermArgs {
    #[arg(help = "Accession (EFO_0000270) or class URI")]
    accession: String,

    #[arg(long, short, help = "Defining ontology, optional for URIs of well-known ontologies")]
    ontology: Option<String>,
}

#[derive(Args)]
struct MappingsArgs {
    #[command(flatten)]
    term: TermArgs,

    #[arg(long, help = "Comma separated target ontologies to keep")]
    preferred: Option<String>,

    #[arg(long)]
    preferred_only: bool,
}

#[derive(Args)]
struct AnnotateArgs {
    text: String,

    #[arg(long, help = "Restrict to these comma separated ontologies")]
    ontologies: Option<String>,

    #[arg(long)]
    longest_only: bool,
}

#[derive(Args)]
struct DiscoverArgs {
    value: String,

    #[arg(long = "type", help = "Fallback label tried when the value matches nothing")]
    type_label: Option<String>,

    #[arg(long)]
    preferred: Option<String>,

    #[arg(long)]
    preferred_only: bool,

    #[arg(long)]
    labels: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(onto) = report.downcast_ref::<OntoError>() {
            return ExitCode::from(map_exit_code(onto));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &OntoError) -> u8 {
    match error {
        OntoError::InvalidArgument(_) | OntoError::InvalidAcronym(_) => 2,
        OntoError::ConfigRead(_) | OntoError::ConfigParse(_) | OntoError::InvalidConfig(_) => 2,
        OntoError::ServiceHttp(_)
        | OntoError::ServiceStatus { .. }
        | OntoError::UnexpectedResponse { .. } => 3,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let client = OntologyClient::from_config(&config)?;

    match cli.command {
        Commands::Ontology(args) => {
            let ontology = client.get_ontology(&args.acronym)?;
            JsonOutput::print(&ontology.as_deref()).into_diagnostic()
        }
        Commands::Term(args) => {
            let class = client.get_ontology_class(args.ontology.as_deref(), &args.accession)?;
            JsonOutput::print(&class.as_deref()).into_diagnostic()
        }
        Commands::Children(args) => run_relation(&client, args, Relation::Children),
        Commands::Descendants(args) => run_relation(&client, args, Relation::Descendants),
        Commands::Parents(args) => run_relation(&client, args, Relation::Parents),
        Commands::Ancestors(args) => run_relation(&client, args, Relation::Ancestors),
        Commands::Mappings(args) => run_mappings(&client, args),
        Commands::Annotate(args) => {
            let mut params = Vec::new();
            if let Some(ontologies) = args.ontologies.as_deref() {
                params.push(("ontologies", ontologies));
            }
            if args.longest_only {
                params.push(("longest_only", "true"));
            }
            let annotations = client.get_text_annotations(&args.text, &params)?;
            JsonOutput::print(&annotations).into_diagnostic()
        }
        Commands::Discover(args) => {
            let discoverer = TermDiscoverer::new(
                Arc::new(client),
                DiscoveryOptions {
                    preferred_ontologies: args.preferred,
                    preferred_only: args.preferred_only,
                    fetch_labels: args.labels,
                },
            );
            let terms = discoverer.discover(&args.value, args.type_label.as_deref())?;
            JsonOutput::print(&terms).into_diagnostic()
        }
    }
}

fn run_relation(
    client: &OntologyClient<HttpTransport>,
    args: TermArgs,
    relation: Relation,
) -> miette::Result<()> {
    let classes = client.class_collection(args.ontology.as_deref(), &args.accession, relation)?;
    JsonOutput::print(&classes).into_diagnostic()
}

fn run_mappings(client: &OntologyClient<HttpTransport>, args: MappingsArgs) -> miette::Result<()> {
    let Some(class) =
        client.get_ontology_class(args.term.ontology.as_deref(), &args.term.accession)?
    else {
        return JsonOutput::print(&None::<()>).into_diagnostic();
    };
    let mappings = client.get_ontology_class_mappings_preferred(
        &class,
        args.preferred.as_deref(),
        args.preferred_only,
    )?;
    JsonOutput::print(&mappings).into_diagnostic()
}
