use anyhow::Result;
use clap::{App, Arg};
use rules_api_client::api::ApiClient;
use rules_api_client::http_client::ClientConfig;
use rules_api_client::output::print::PrintOutputter;
use rules_api_client::verify::{self, Credentials};
use std::borrow::BorrowMut;
use std::io::stdout;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let matches = App::new("verify-api")
        .version(VERSION)
        .about("Runs the end-to-end verification sequence against a rules service")
        .arg(
            Arg::with_name("HOST")
                .index(1)
                .help("Base URL of the service, e.g. http://localhost:9000")
                .default_value("http://localhost:9000"),
        )
        .arg(
            Arg::with_name("USERNAME")
                .short("u")
                .long("username")
                .takes_value(true)
                .required(true)
                .help("Username for the password-grant token exchange"),
        )
        .arg(
            Arg::with_name("PASSWORD")
                .short("p")
                .long("password")
                .takes_value(true)
                .required(true)
                .help("Password for the password-grant token exchange"),
        )
        .arg(
            Arg::with_name("ACCEPT_INVALID_CERT")
                .short("k")
                .long("danger-accept-invalid-certs")
                .help("Controls the use of certificate validation."),
        )
        .usage("verify-api [OPTIONS] -u <USERNAME> -p <PASSWORD> [HOST]")
        .get_matches();

    let host = matches.value_of("HOST").unwrap();
    let credentials = Credentials {
        username: matches.value_of("USERNAME").unwrap().to_string(),
        password: matches.value_of("PASSWORD").unwrap().to_string(),
    };
    let accept_invalid_certs = matches.is_present("ACCEPT_INVALID_CERT");

    let client_config = ClientConfig::new(accept_invalid_certs);
    let mut client = ApiClient::new(host, client_config)?;

    let mut stdout = stdout();
    let mut outputter = PrintOutputter::new(stdout.borrow_mut());

    verify::run(&mut client, &mut outputter, &credentials)
}
