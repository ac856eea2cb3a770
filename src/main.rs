use std::env;
use std::ffi::OsStr;

use chrono::Local;
use log::info;
use seahorse::{App, Command, Context, Flag, FlagType};

use tcup::config::{ConfigDefaults, ConfigStore};
use tcup::document::TimesheetDocument;
use tcup::write_time_sheet;

const DEFAULT_CONFIG_PATH: &str = "tcup-config.txt";
const DEFAULT_OUTPUT_PATH: &str = "tcup-timesheet.txt";

fn set_env_if_absent<K: AsRef<OsStr>, V: AsRef<OsStr>>(var: K, default: impl FnOnce() -> V) {
    if env::var(var.as_ref()).is_err() {
        env::set_var(var, default());
    }
}

fn main() {
    set_env_if_absent("RUST_APP_LOG", || "info");
    color_backtrace::install();
    pretty_env_logger::init_custom_env("RUST_APP_LOG");

    run();
}

mod seahorse_exts {
    use core::fmt;

    use log::error;
    use seahorse::Context;

    type TryAction<E> = fn(_: &Context) -> Result<(), E>;

    pub trait ErrorLike: Send + Sync + fmt::Debug + 'static {}

    impl<E: Send + Sync + fmt::Debug + 'static> ErrorLike for E {}

    pub fn try_action<E>(action: TryAction<E>, context: &Context)
    where
        E: ErrorLike,
    {
        if let Err(e) = action(context) {
            error!("{:?}", e);
            ::std::process::exit(1);
        }
    }
}

fn config_path(context: &Context) -> String {
    context
        .string_flag("config")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

fn load_config(context: &Context) -> anyhow::Result<ConfigStore> {
    let mut store = ConfigStore::load(config_path(context), &ConfigDefaults::default())?;

    if store.newly_created() {
        info!("created a new config at `{}`", store.path().display());
    }

    // write back any defaults that had to be filled in
    store.persist()?;

    Ok(store)
}

fn init(context: &Context) -> anyhow::Result<()> {
    let store = load_config(context)?;
    info!("config at `{}` is complete", store.path().display());

    Ok(())
}

fn make(context: &Context) -> anyhow::Result<()> {
    let store = load_config(context)?;
    let config = store.config();

    let mut document = TimesheetDocument::new(config);
    document.ensure_header(None, None, Local::now().date_naive())?;

    write_time_sheet(&document, DEFAULT_OUTPUT_PATH)?;

    Ok(())
}

fn config_flag() -> Flag {
    Flag::new("config", FlagType::String).description(format!(
        "[optional] Path to the config file. Default: `{}`",
        DEFAULT_CONFIG_PATH
    ))
}

fn run() {
    let args: Vec<String> = env::args().collect();

    let init_command = Command::new("init")
        .usage(format!("{} init [args]", args[0]))
        .description("Creates or completes the config file.")
        .flag(config_flag())
        .action(|context| seahorse_exts::try_action(init, context));

    let make_command = Command::new("make")
        .usage(format!("{} make [args]", args[0]))
        .description("Starts a new timesheet from the config file.")
        .flag(config_flag())
        .action(|context| seahorse_exts::try_action(make, context));

    let app = App::new(env!("CARGO_PKG_NAME"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .usage(format!("{} [command]", args[0]))
        .command(init_command)
        .command(make_command);

    app.run(args);
}
