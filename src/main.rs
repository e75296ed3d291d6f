use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser, Debug)]
#[command(name = "ledgerlens", version, about = "Small-business statements and tax estimates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimated taxes, write-offs and estimate accuracy
    Report(cmd::report::ReportCommand),
    /// Profit and loss, balance sheet, cash flow and monthly trend
    Statements(cmd::statements::StatementsCommand),
    /// Revenue by customer, or revenue still needing a customer
    Customers(cmd::customers::CustomersCommand),
    /// Spending grouped by vendor
    Vendors(cmd::vendors::VendorsCommand),
    /// Check transactions for data quality issues
    Validate(cmd::validate::ValidateCommand),
    /// Print the JSON Schema of an input file
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report(report) => report.exec(),
        Command::Statements(statements) => statements.exec(),
        Command::Customers(customers) => customers.exec(),
        Command::Vendors(vendors) => vendors.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
