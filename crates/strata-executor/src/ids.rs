use std::collections::HashSet;

use uuid::Uuid;

use crate::error::SubmissionError;

/// Size used when a caller does not ask for a specific length.
pub const DEFAULT_ID_SIZE: usize = 10;

/// Largest stateful ID the generator will issue.
pub const MAX_ID_SIZE: usize = 64;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MAX_DRAWS: usize = 1024;

/// Issues stateful IDs that are unique within one run.
///
/// IDs are lowercase alphanumeric strings drawn from UUID v4 randomness.
/// Every ID handed out or registered is remembered; a draw that collides is
/// discarded and redrawn.
#[derive(Debug, Default)]
pub struct StatefulIdGenerator {
  issued: HashSet<String>,
}

impl StatefulIdGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn random_id(&mut self, size: usize) -> Result<String, SubmissionError> {
    if size == 0 || size > MAX_ID_SIZE {
      return Err(SubmissionError::InvalidSize {
        size,
        max: MAX_ID_SIZE,
      });
    }

    for _ in 0..MAX_DRAWS {
      let id = draw(size);
      if self.issued.insert(id.clone()) {
        return Ok(id);
      }
    }

    Err(SubmissionError::IdSpaceExhausted { size })
  }

  /// Claim an externally supplied ID.
  pub fn register(&mut self, id: &str) -> Result<(), SubmissionError> {
    validate_stateful_id(id)?;
    if !self.issued.insert(id.to_string()) {
      return Err(SubmissionError::DuplicateStatefulId {
        stateful_id: id.to_string(),
      });
    }
    Ok(())
  }

  pub fn is_issued(&self, id: &str) -> bool {
    self.issued.contains(id)
  }

  pub fn len(&self) -> usize {
    self.issued.len()
  }

  pub fn is_empty(&self) -> bool {
    self.issued.is_empty()
  }
}

/// Check that an ID has the shape the generator issues.
///
/// Executors use stateful IDs as file and key names, so anything outside the
/// alphabet is refused.
pub fn validate_stateful_id(id: &str) -> Result<(), SubmissionError> {
  let valid = !id.is_empty() && id.len() <= MAX_ID_SIZE && id.bytes().all(|b| ALPHABET.contains(&b));
  if !valid {
    return Err(SubmissionError::InvalidStatefulId {
      stateful_id: id.to_string(),
      max: MAX_ID_SIZE,
    });
  }
  Ok(())
}

fn draw(size: usize) -> String {
  let mut id = String::with_capacity(size);
  while id.len() < size {
    for byte in Uuid::new_v4().as_bytes() {
      if id.len() == size {
        break;
      }
      id.push(ALPHABET[*byte as usize % ALPHABET.len()] as char);
    }
  }
  id
}
