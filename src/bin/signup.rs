//! Terminal signup against a running CheckMedi server.
//!
//! `checkmedi-signup` prompts for the form; `checkmedi-signup logout`
//! forgets the stored session.

use std::io::{self, BufRead, Write};

use dotenv::dotenv;

use checkmedi::config::ClientConfig;
use checkmedi::signup::api::HttpAuthApi;
use checkmedi::signup::form::Field;
use checkmedi::signup::session::{FileTokenStore, Session};
use checkmedi::signup::{Mount, Navigator, SignupController};

struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&mut self, route: &str) {
        println!("➡️  Continue at {route}");
    }
}

// `None` once stdin is closed.
fn prompt(input: &mut impl BufRead, field: Field) -> io::Result<Option<String>> {
    print!("{}: ", field.placeholder());
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    checkmedi::init_tracing();

    let config = ClientConfig::from_env();
    let session = Session::open(FileTokenStore::new(&config.session_file))?;
    let api = HttpAuthApi::new(config.api_url.as_str());
    let mut controller = SignupController::new(api, session, TerminalNavigator);

    if std::env::args().nth(1).as_deref() == Some("logout") {
        controller.logout()?;
        println!("👋 Signed out");
        return Ok(());
    }

    if controller.mount() == Mount::Redirected {
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    // Fields are re-read each step: picking Doctor adds the doctor block.
    let mut index = 0;
    loop {
        let fields = controller.form().visible_fields();
        let Some(&field) = fields.get(index) else {
            break;
        };
        let Some(value) = prompt(&mut input, field)? else {
            anyhow::bail!("input closed before the form was complete");
        };
        match controller.update(field.as_str(), &value) {
            Ok(()) => index += 1,
            Err(e) => println!("❌ {e}"),
        }
    }

    if controller.submit().await.is_err() {
        let message = controller.error().unwrap_or("Signup failed").to_string();
        anyhow::bail!(message);
    }
    Ok(())
}
