//! Batch client for the Medical Note Structurer.
//!
//! Reads a CSV of clinical notes, sends each note to the extraction service
//! sequentially, and writes the structured results table as CSV. Per-row
//! failures are substituted with sentinel values and never abort the batch.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use api_shared::BackendStatus;
use mns_core::batch::{
    self, ExtractApi, HttpExtractApi, DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
};

/// Sample notes matching the documented input format.
const SAMPLE_NOTES_CSV: &str = concat!(
    "patient_id,doctor_notes\n",
    "001,\"Patient complains of fatigue and joint pain for 3 weeks. Morning stiffness lasting 2 hours. Physical exam shows swollen joints in hands and wrists. Diagnosed with rheumatoid arthritis. Started methotrexate 15mg weekly and folic acid 5mg daily. Follow-up in 6 weeks to monitor response and check liver function.\"\n",
    "002,\"Severe cough and shortness of breath for 5 days. Fever 101.5F. Chest X-ray shows consolidation in right lower lobe. Possible pneumonia. Started azithromycin 500mg daily for 5 days. Return if symptoms worsen or no improvement in 3 days.\"\n",
    "003,\"Routine checkup. Blood pressure 140/90. Patient reports headaches and dizziness. No chest pain. Started lisinopril 10mg daily for hypertension. Lifestyle counseling provided. Recheck blood pressure in 2 weeks.\"\n",
);

const HEALTH_PROBE_TIMEOUT_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "mns")]
#[command(about = "Medical note structurer batch client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a CSV of clinical notes through the extraction service
    Batch {
        /// Input CSV with patient_id and doctor_notes columns
        input: PathBuf,
        /// Output CSV path
        #[arg(short, long, default_value = "structured_medical_notes.csv")]
        output: PathBuf,
        /// Base URL of the extraction service
        #[arg(long, default_value = DEFAULT_BACKEND_URL)]
        backend_url: String,
    },
    /// Extract a single note and print the structured payload
    Extract {
        /// Free-text clinical note
        note: String,
        /// Base URL of the extraction service
        #[arg(long, default_value = DEFAULT_BACKEND_URL)]
        backend_url: String,
    },
    /// Check that the service and its generation backend are reachable
    Health {
        /// Base URL of the extraction service
        #[arg(long, default_value = DEFAULT_BACKEND_URL)]
        backend_url: String,
    },
    /// Write the bundled sample notes CSV
    Sample {
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Batch {
            input,
            output,
            backend_url,
        }) => run_batch(&input, &output, &backend_url)?,
        Some(Commands::Extract { note, backend_url }) => {
            let api = HttpExtractApi::new(
                &backend_url,
                Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            )?;
            match api.extract(&note) {
                Ok(res) => println!("{}", res.structured),
                Err(e) => eprintln!("Extraction failed: {e}"),
            }
        }
        Some(Commands::Health { backend_url }) => {
            let api =
                HttpExtractApi::new(&backend_url, Duration::from_secs(HEALTH_PROBE_TIMEOUT_SECS))?;
            match api.health() {
                Ok(res) if res.ollama == BackendStatus::Connected => {
                    println!("Backend and Ollama connected");
                }
                Ok(_) => println!("Backend connected but Ollama disconnected"),
                Err(e) => eprintln!("Cannot connect to backend: {e}"),
            }
        }
        Some(Commands::Sample { output }) => match output {
            Some(path) => {
                let mut file =
                    File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                file.write_all(SAMPLE_NOTES_CSV.as_bytes())?;
                println!("Wrote sample notes to {}", path.display());
            }
            None => print!("{SAMPLE_NOTES_CSV}"),
        },
        None => {
            println!("Use 'mns --help' for commands");
        }
    }

    Ok(())
}

fn run_batch(input: &PathBuf, output: &PathBuf, backend_url: &str) -> anyhow::Result<()> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let notes = batch::read_notes(file)?;
    println!("Loaded {} clinical notes", notes.len());

    let api = HttpExtractApi::new(
        backend_url,
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
    )?;

    let rows = batch::process_batch(&api, &notes, |done, total| {
        println!("Processing note {done} of {total}...");
    });

    let out =
        File::create(output).with_context(|| format!("creating {}", output.display()))?;
    batch::write_results(&rows, out)?;

    let summary = batch::summarize(&rows);
    println!("Extraction complete: {}", output.display());
    println!("Total notes processed: {}", summary.total);
    println!("Successfully processed: {}", summary.successful);
    println!("Error rate: {:.1}%", summary.error_rate());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_csv_parses_with_required_columns() {
        let notes = batch::read_notes(SAMPLE_NOTES_CSV.as_bytes()).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].patient_id, "001");
        assert!(notes[2].note.contains("lisinopril 10mg daily"));
    }
}
