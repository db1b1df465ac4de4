//! The tutor: every teacher-facing workflow of MathDesk.
//!
//! Each workflow follows the same cycle:
//!
//! 1. **Validate** the teacher's input (nothing else happens if it is empty)
//! 2. **Assemble** the request context (instruction + history + new input)
//! 3. **Complete** via the configured provider
//! 4. **Record** the exchange on a copy of the archive and persist it
//! 5. **Return** the generated text for rendering
//!
//! Reports and quizzes stop after step 3; they never touch the archive.

pub mod history;
pub mod image;
pub mod prompts;
pub mod tutor;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use image::{ImageAttachment, ImageFormat};
pub use prompts::{Difficulty, QuizRequest};
pub use tutor::{Tutor, TutorSettings};
