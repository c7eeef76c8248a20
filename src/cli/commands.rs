use crate::guidance::types::FieldKind;
use clap::{Parser, Subcommand};

/// `formaid` - field-by-field guidance for government web forms.
#[derive(Parser, Debug)]
#[command(name = "formaid")]
#[command(version)]
#[command(about = "Field-by-field guidance for government web forms.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway used by the browser extension
    Serve {
        /// Host to bind to (default: [gateway] host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: [gateway] port, 0 for a random port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask for guidance on a single form field
    Ask {
        /// Field label exactly as shown on the form
        label: String,

        /// Control kind: input, select or other
        #[arg(long, default_value = "input")]
        field_type: FieldKind,

        /// Options shown for the field, one per line
        #[arg(long)]
        options: Option<String>,

        /// Name of the form, e.g. "Indian Passport Application Form"
        #[arg(long)]
        form_context: Option<String>,
    },

    /// Show recent guidance interactions, newest first
    History {
        /// Number of records (default: [history] default_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
}
