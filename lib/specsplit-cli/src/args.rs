use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use specsplit_core::{MultiTagPolicy, OutputFormat, SplitConfig, SplitMethod};

const DEFAULT_OUTPUT_DIR: &str = "split_specs";

const HELP: &str = "\
Split an OpenAPI document into self-contained documents grouped by tag or path prefix

Usage: specsplit <INPUT> [OPTIONS]

Arguments:
  <INPUT>                      OpenAPI document (.yaml, .yml or .json)

Options:
  -m, --method <METHOD>        Grouping method: tags, paths [default: tags]
  -o, --output <DIR>           Output directory [default: split_specs]
  -l, --levels <LEVELS>        Path segments naming a group in paths mode [default: 2]
  -f, --format <FORMAT>        Output format: yaml, json [default: yaml]
      --multi-tag <POLICY>     Operations with several tags: first, every [default: first]
      --strict                 Fail when a reference cannot be resolved
  -v, --verbose                Enable debug logs
  -V, --version                Print version
  -h, --help                   Print help
";

#[derive(Debug)]
pub struct CliArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub config: SplitConfig,
    pub verbose: bool,
    /// Arguments left after parsing, reported once logging is set up.
    pub unused: Vec<OsString>,
}

impl CliArgs {
    /// Parses the command line, returns `None` when help or version was printed.
    #[allow(clippy::print_stdout)]
    pub fn parse(mut pargs: pico_args::Arguments) -> Result<Option<Self>> {
        if pargs.contains(["-h", "--help"]) {
            print!("{HELP}");
            return Ok(None);
        }
        if pargs.contains(["-V", "--version"]) {
            println!("specsplit {}", env!("CARGO_PKG_VERSION"));
            return Ok(None);
        }

        let method: Option<SplitMethod> = pargs
            .opt_value_from_str(["-m", "--method"])
            .context("parsing method argument")?;
        let output: Option<PathBuf> = pargs
            .opt_value_from_str(["-o", "--output"])
            .context("parsing output argument")?;
        let levels: Option<NonZeroUsize> = pargs
            .opt_value_from_str(["-l", "--levels"])
            .context("parsing levels argument")?;
        let format: Option<OutputFormat> = pargs
            .opt_value_from_str(["-f", "--format"])
            .context("parsing format argument")?;
        let multi_tag: Option<MultiTagPolicy> = pargs
            .opt_value_from_str("--multi-tag")
            .context("parsing multi-tag argument")?;
        let strict = pargs.contains("--strict");
        let verbose = pargs.contains(["-v", "--verbose"]);

        let input: Option<PathBuf> = pargs
            .opt_free_from_str()
            .context("parsing input argument")?;
        let Some(input) = input else {
            bail!("missing input document, see `specsplit --help`");
        };

        let mut config = SplitConfig::default()
            .with_method(method.unwrap_or_default())
            .with_multi_tag(multi_tag.unwrap_or_default())
            .with_strict(strict);
        if let Some(levels) = levels {
            config = config.with_path_levels(levels);
        }

        Ok(Some(Self {
            input,
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            format: format.unwrap_or_default(),
            config,
            verbose,
            unused: pargs.finish(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<Option<CliArgs>> {
        let args = args.iter().map(OsString::from).collect();
        CliArgs::parse(pico_args::Arguments::from_vec(args))
    }

    #[test]
    fn should_use_defaults() {
        let args = parse(&["openapi.yaml"])
            .expect("valid arguments")
            .expect("not help");

        assert_eq!(args.input, PathBuf::from("openapi.yaml"));
        assert_eq!(args.output, PathBuf::from("split_specs"));
        assert_eq!(args.format, OutputFormat::Yaml);
        assert_eq!(args.config, SplitConfig::default());
        assert!(!args.verbose);
        assert!(args.unused.is_empty());
    }

    #[test]
    fn should_keep_unused_arguments() {
        let args = parse(&["openapi.yaml", "stray-arg", "--bogus"])
            .expect("valid arguments")
            .expect("not help");

        assert_eq!(args.input, PathBuf::from("openapi.yaml"));
        assert_eq!(
            args.unused,
            [OsString::from("stray-arg"), OsString::from("--bogus")]
        );
    }

    #[test]
    fn should_parse_every_option() {
        let args = parse(&[
            "-m", "paths", "-o", "out", "-l", "3", "-f", "json", "--multi-tag", "every",
            "--strict", "-v", "api.json",
        ])
        .expect("valid arguments")
        .expect("not help");

        assert_eq!(args.input, PathBuf::from("api.json"));
        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.config.method, SplitMethod::ByPath);
        assert_eq!(args.config.path_levels.get(), 3);
        assert_eq!(args.config.multi_tag, MultiTagPolicy::EveryTag);
        assert!(args.config.strict);
        assert!(args.verbose);
    }

    #[rstest]
    #[case("by-tag", SplitMethod::ByTag)]
    #[case("by-path", SplitMethod::ByPath)]
    fn should_accept_method_aliases(#[case] value: &str, #[case] expected: SplitMethod) {
        let args = parse(&["--method", value, "openapi.yaml"])
            .expect("valid arguments")
            .expect("not help");

        assert_eq!(args.config.method, expected);
    }

    #[test]
    fn should_stop_on_help() {
        let args = parse(&["--help"]).expect("valid arguments");

        assert!(args.is_none());
    }

    #[rstest]
    #[case(&[])]
    #[case(&["-m", "tags"])]
    fn should_require_input(#[case] args: &[&str]) {
        let error = parse(args).expect_err("should fail");

        assert!(error.to_string().contains("missing input document"));
    }

    #[rstest]
    #[case(&["-l", "0", "openapi.yaml"])]
    #[case(&["-m", "operations", "openapi.yaml"])]
    #[case(&["-f", "xml", "openapi.yaml"])]
    fn should_reject_invalid_values(#[case] args: &[&str]) {
        let result = parse(args);

        assert!(result.is_err());
    }
}
