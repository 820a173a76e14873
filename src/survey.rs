// ABOUTME: Interactive terminal survey collecting the ten preference answers.
// ABOUTME: Blank answers fall through to the NO PREFERENCE sentinel in the profile.

use std::io::{BufRead, Write};

use advisor_core::PreferenceProfile;

const QUESTIONS: [&str; 10] = [
    "Preferred ECTS credit load (a number or a range like 6-8)",
    "ECTS credit load you want to avoid",
    "Topics you are interested in (e.g. history, finance; several are fine)",
    "Topics you do not want courses from",
    "Preferred delivery mode (e.g. online course, workshop)",
    "Delivery mode you want to avoid",
    "Preferred assessment type (attendance / project / exam)",
    "Assessment type you want to avoid",
    "Any extra preferences",
    "Any extra constraints",
];

/// Run the survey against stdin/stdout.
pub fn collect_profile() -> std::io::Result<PreferenceProfile> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    collect_from(&mut stdin.lock(), &mut stdout)
}

/// Ask the ten questions on `writer`, reading one answer line each from
/// `reader`. Split out from [`collect_profile`] so tests can drive it.
pub fn collect_from<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> std::io::Result<PreferenceProfile> {
    writeln!(
        writer,
        "Describe your course preferences. Leave a field blank for no preference."
    )?;

    let mut answers = Vec::with_capacity(QUESTIONS.len());
    for question in QUESTIONS {
        write!(writer, "{question}: ")?;
        writer.flush()?;

        let mut line = String::new();
        reader.read_line(&mut line)?;
        answers.push(line.trim_end_matches(['\n', '\r']).to_string());
    }

    Ok(PreferenceProfile::from_answers(
        &answers[0], &answers[1], &answers[2], &answers[3], &answers[4], &answers[5], &answers[6],
        &answers[7], &answers[8], &answers[9],
    ))
}
