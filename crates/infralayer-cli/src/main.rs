use infralayer_core::options::UnknownCategory;
use infralayer_core::{
    Category, CompiledFilter, ControllerConfig, FilterOption, LayerSpec, MapStateController,
    StyleDocument,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(infralayer_core::Error),
    Json(serde_json::Error),
    Category(UnknownCategory),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Category(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<infralayer_core::Error> for CliError {
    fn from(value: infralayer_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<UnknownCategory> for CliError {
    fn from(value: UnknownCategory) -> Self {
        Self::Category(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Bake,
    Compile,
    Layers,
    State,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    positional: Option<String>,
    config: Option<String>,
    state: Option<String>,
    hide: Vec<String>,
    select: Vec<(String, Vec<String>)>,
    pretty: bool,
}

fn usage() -> &'static str {
    "infralayer-cli\n\
\n\
USAGE:\n\
  infralayer-cli [bake] [--config <path>] [--state <ids>] [--hide <category>]... [--select <category>=<ids>]... [--pretty] [<style.json>|-]\n\
  infralayer-cli compile [--config <path>] [--hide <category>]... [--select <category>=<ids>]... [--pretty] <category>\n\
  infralayer-cli layers [--config <path>] [--pretty]\n\
  infralayer-cli state [--config <path>] [<ids>]\n\
\n\
NOTES:\n\
  - If <style.json> is omitted or '-', the style is read from stdin.\n\
  - <category> is one of: plants, substations, voltage.\n\
  - <ids> is a comma-separated list; an empty list selects nothing (e.g. --select voltage=).\n\
  - bake prints the style with layer visibility and filters applied.\n\
  - state prints the canonical serialized form of <ids> (empty for the default layers).\n\
  - Logging goes to stderr and is controlled by INFRALAYER_LOG (default: warn).\n\
"
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "bake" => args.command = Command::Bake,
            "compile" => args.command = Command::Compile,
            "layers" => args.command = Command::Layers,
            "state" => args.command = Command::State,
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--state" => {
                let Some(state) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.state = Some(state.clone());
            }
            "--hide" => {
                let Some(category) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.hide.push(category.clone());
            }
            "--select" => {
                let Some(spec) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let Some((category, ids)) = spec.split_once('=') else {
                    return Err(CliError::Usage(usage()));
                };
                args.select.push((category.to_string(), split_ids(ids)));
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.positional.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.positional = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            value => {
                if args.positional.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.positional = Some(value.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<ControllerConfig, CliError> {
    match path {
        None => Ok(ControllerConfig::default()),
        Some(path) => Ok(ControllerConfig::from_json_str(&std::fs::read_to_string(
            path,
        )?)?),
    }
}

/// Builds a detached controller and replays the command-line state onto it, the same way the
/// control panel and URL manager would.
fn build_controller(args: &Args) -> Result<MapStateController<StyleDocument>, CliError> {
    let config = load_config(args.config.as_deref())?;
    let mut controller = MapStateController::new(config)?;

    for (name, ids) in &args.select {
        let category: Category = name.parse()?;
        for option in category.options() {
            let selected = ids.iter().any(|id| id == option.id);
            controller.set_category_selection(category, option.id, selected);
        }
        for id in ids {
            if category.option(id).is_none() {
                tracing::warn!(%category, id = id.as_str(), "unknown filter option");
            }
        }
    }
    for name in &args.hide {
        let category: Category = name.parse()?;
        controller.set_category_enabled(category, false);
    }
    if let Some(state) = &args.state {
        controller.apply_serialized_state(state);
    }
    Ok(controller)
}

fn bake(args: &Args) -> Result<(), CliError> {
    let mut controller = build_controller(args)?;
    let text = read_input(args.positional.as_deref())?;
    let style: Value = serde_json::from_str(&text)?;

    controller.attach(StyleDocument::loaded(style));
    let Some(doc) = controller.detach() else {
        return Ok(());
    };
    write_json(doc.as_value(), args.pretty)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompileOut<'a> {
    category: Category,
    enabled: bool,
    selected: Vec<&'static str>,
    outcome: &'a str,
    filter: Option<&'a Value>,
}

fn compile(args: &Args) -> Result<(), CliError> {
    let Some(name) = args.positional.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let category: Category = name.parse()?;
    let controller = build_controller(args)?;

    let compiled = controller.compiled_filter(category);
    let outcome = match &compiled {
        CompiledFilter::Unrestricted => "unrestricted",
        CompiledFilter::MatchNothing => "matchNothing",
        CompiledFilter::Predicate(_) => "predicate",
    };
    let out = CompileOut {
        category,
        enabled: controller.category_enabled(category),
        selected: controller.selection(category).ids(),
        outcome,
        filter: compiled.predicate().map(|p| p.as_value()),
    };
    write_json(&out, args.pretty)
}

#[derive(Serialize)]
struct CategoryOut {
    category: Category,
    options: &'static [FilterOption],
    layers: &'static [&'static str],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayersOut<'a> {
    layers: &'a [LayerSpec],
    default_visible: Vec<&'a str>,
    categories: Vec<CategoryOut>,
}

fn layers(args: &Args) -> Result<(), CliError> {
    let controller = build_controller(args)?;
    let out = LayersOut {
        layers: controller.layers(),
        default_visible: controller
            .registry()
            .default_visible()
            .iter()
            .map(String::as_str)
            .collect(),
        categories: Category::ALL
            .into_iter()
            .map(|category| CategoryOut {
                category,
                options: category.options(),
                layers: category.filtered_layers(),
            })
            .collect(),
    };
    write_json(&out, args.pretty)
}

fn state(args: &Args) -> Result<(), CliError> {
    let mut controller = build_controller(args)?;
    controller.apply_serialized_state(args.positional.as_deref().unwrap_or(""));
    println!("{}", controller.get_serialized_state());
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    tracing::debug!(command = ?args.command, "running");
    match args.command {
        Command::Bake => bake(&args),
        Command::Compile => compile(&args),
        Command::Layers => layers(&args),
        Command::State => state(&args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("INFRALAYER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
