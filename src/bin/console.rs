use muirgen::client::{
    ClientError, ConsoleApi, ConsoleSession, DEFAULT_POLL_PERIOD, DbStatus, FileTokenStore, HttpConsoleApi, LOGOUT_NOTICE, UserSetupForm,
    VesselSetupForm, View,
};
use muirgen::init_tracing;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
const DEFAULT_TOKEN_DIR: &str = ".muirgen";

fn print_usage(bin_name: &str) {
    eprintln!("Usage:");
    eprintln!("  {bin_name} status");
    eprintln!("  {bin_name} watch");
    eprintln!("  {bin_name} login <handle> <password>");
    eprintln!("  {bin_name} logout");
    eprintln!("  {bin_name} vessels");
    eprintln!("  {bin_name} setup-vessel <name> [official-number]");
    eprintln!("  {bin_name} setup-user <handle> <name> <password> <confirm> [--admin]");
}

fn describe(view: Option<View>) -> &'static str {
    match view {
        None => "Connecting...",
        Some(View::VesselSetupRequired) => "Vessel registration required",
        Some(View::UserSetupRequired) => "User registration required",
        Some(View::LoginRequired) => "Login required",
        Some(View::AwaitingVesselFetch) => "Loading vessel...",
        Some(View::Ready) => "Ready",
        Some(View::LoggingOut) => "Session closed",
    }
}

type Session = ConsoleSession<HttpConsoleApi, FileTokenStore>;

async fn print_status(session: &Session) {
    match session.db_status().await {
        Some(DbStatus::Online { server_time }) => {
            println!("Core Database: Online");
            println!("Date/Time: {server_time}");
        }
        Some(DbStatus::Offline(message)) => println!("Core Database: {message}"),
        None => println!("Core Database: Connecting..."),
    }

    println!("Screen: {}", describe(session.view().await));
    if let Some(vessel) = session.vessel().await {
        println!("Vessel: {}", vessel.vessel_name);
        println!("Official Number: {}", vessel.vessel_official_number.as_deref().unwrap_or("-"));
    }
}

enum Command {
    Status,
    Watch,
    Login { handle: String, password: String },
    Logout,
    Vessels,
    SetupVessel(VesselSetupForm),
    SetupUser(UserSetupForm),
}

fn parse(command: &str, args: Vec<String>) -> Option<Command> {
    let mut args = args.into_iter();
    let command = match command {
        "status" => Command::Status,
        "watch" => Command::Watch,
        "logout" => Command::Logout,
        "vessels" => Command::Vessels,
        "login" => Command::Login {
            handle: args.next()?,
            password: args.next()?,
        },
        "setup-vessel" => Command::SetupVessel(VesselSetupForm {
            name: args.next()?,
            official_number: args.next().unwrap_or_default(),
            ..VesselSetupForm::default()
        }),
        "setup-user" => {
            let mut form = UserSetupForm {
                handle: args.next()?,
                name: args.next()?,
                password: args.next()?,
                password_confirm: args.next()?,
                ..UserSetupForm::default()
            };
            if let Some(flag) = args.next() {
                if flag != "--admin" {
                    return None;
                }
                form.is_admin = true;
            }
            Command::SetupUser(form)
        }
        _ => return None,
    };

    // trailing arguments are a usage error
    if args.next().is_some() { None } else { Some(command) }
}

async fn run(session: &Arc<Session>, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Status => {
            session.refresh().await?;
            print_status(session).await;
        }
        Command::Watch => {
            session.refresh().await?;
            let _poller = session.spawn_poller(DEFAULT_POLL_PERIOD);

            // runs until the process is interrupted
            let mut ticker = tokio::time::interval(DEFAULT_POLL_PERIOD);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                print_status(session).await;
                println!();
            }
        }
        Command::Login { handle, password } => {
            session.login(&handle, &password).await?;
            println!("Access granted.");
            print_status(session).await;
        }
        Command::Logout => {
            println!("Session closed. Returning to login in {}s...", LOGOUT_NOTICE.as_secs());
            session.logout().await?;
            println!("Screen: {}", describe(session.view().await));
        }
        Command::Vessels => {
            for vessel in session.api().list_active_vessels().await? {
                println!("{}  {}", vessel.uuid, vessel.name);
            }
        }
        Command::SetupVessel(form) => {
            session.submit_vessel_setup(form).await?;
            println!("Vessel registered.");
        }
        Command::SetupUser(form) => {
            session.submit_user_setup(form).await?;
            println!("Registration Successful.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing(&std::env::var("MUIRGEN_CONSOLE_LOG").unwrap_or_else(|_| "warn".to_string()), false);

    let mut args = std::env::args();
    let bin_name = args.next().unwrap_or_else(|| "console".to_string());
    let Some(command) = args.next() else {
        print_usage(&bin_name);
        std::process::exit(2);
    };
    let Some(command) = parse(&command, args.collect()) else {
        print_usage(&bin_name);
        std::process::exit(2);
    };

    let api_url = std::env::var("MUIRGEN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let token_dir = std::env::var("MUIRGEN_TOKEN_DIR").unwrap_or_else(|_| DEFAULT_TOKEN_DIR.to_string());
    let session = Arc::new(ConsoleSession::new(HttpConsoleApi::new(api_url), FileTokenStore::new(token_dir)));

    if let Err(err) = run(&session, command).await {
        eprintln!("{}", err.message());
        std::process::exit(1);
    }
}
