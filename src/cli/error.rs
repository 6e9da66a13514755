// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Resolve a roster reference to a 0-based position.
///
/// A reference is either a 1-based number or an exact name (matched
/// case-insensitively after trimming). `label` names the roster kind in
/// error messages.
pub fn resolve_member(label: &str, names: &[&str], reference: &str) -> Result<usize, String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(format!("Missing {} reference", label));
    }

    if let Ok(number) = reference.parse::<i64>() {
        let count = names.len() as i64;
        if number >= 1 && number <= count {
            return Ok((number - 1) as usize);
        }
        return Err(format!(
            "Invalid {} number: {}. Expected 1-{}.",
            label, number, count
        ));
    }

    let matches: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| name.trim().eq_ignore_ascii_case(reference))
        .map(|(index, _)| index)
        .collect();
    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(format!("No {} named '{}'", label, reference)),
        _ => Err(format!(
            "Multiple {}s named '{}'; use the number instead",
            label, reference
        )),
    }
}
