// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
 __  __
|  \/  | ___ _ ____  ___ __ ___   __ _ _ __
| |\/| |/ _ \ '__\ \/ / '_ ` _ \ / _` | '_ \
| |  | |  __/ |   >  <| | | | | | (_| | | | |
|_|  |_|\___|_|  /_/\_\_| |_| |_|\__,_|_| |_|

    AI Video - Order Desk & Status Relay
"#;
    println!("{}", banner);
}
