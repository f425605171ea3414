use radius_client::{Client, Settings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: {} <username> <password> <secret> [server]", args[0]);
        eprintln!("Example: {} admin admin123 testing123 127.0.0.1", args[0]);
        std::process::exit(1);
    }

    let username = &args[1];
    let password = &args[2];
    let secret = &args[3];
    let server = args.get(4).map(String::as_str).unwrap_or("127.0.0.1");

    let client = Client::from_settings(Settings::new(server, secret.as_str()))?;

    println!("Authenticating {username} against {server}:1812 ...");
    let outcome = client.authenticate(username, password)?;

    if outcome.is_accept() {
        println!("Access-Accept");
    } else {
        println!("Access-Reject");
    }
    if let Some(message) = outcome.reply_message() {
        println!("Server says: {message}");
    }
    println!(
        "Reply carried {} attribute(s), identifier {}",
        outcome.packet().attributes.len(),
        outcome.packet().identifier
    );

    Ok(())
}
