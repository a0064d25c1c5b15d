use std::{fmt, str::FromStr};

use crate::statement::PrepareError;

pub const ID_SIZE: usize = size_of::<u32>();
pub const USERNAME_SIZE: usize = 32;
pub const EMAIL_SIZE: usize = 255;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

/// A single `(id, username, email)` record, fixed-width on disk at [`ROW_SIZE`] bytes.
pub struct Row {
    pub id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self, PrepareError> {
        if username.len() > USERNAME_SIZE || email.len() > EMAIL_SIZE {
            return Err(PrepareError::StringTooLong);
        }

        let mut username_buf = [0; USERNAME_SIZE];
        username_buf[..username.len()].copy_from_slice(username.as_bytes());

        let mut email_buf = [0; EMAIL_SIZE];
        email_buf[..email.len()].copy_from_slice(email.as_bytes());

        Ok(Self {
            id,
            username: username_buf,
            email: email_buf,
        })
    }

    pub fn username(&self) -> String {
        String::from_utf8_lossy(&self.username)
            .trim_end_matches(char::from(0))
            .to_string()
    }

    pub fn email(&self) -> String {
        String::from_utf8_lossy(&self.email)
            .trim_end_matches(char::from(0))
            .to_string()
    }

    pub fn serialize(&self, dst: &mut [u8]) {
        let start = 0;
        let end = ID_SIZE;
        dst[start..end].copy_from_slice(&self.id.to_le_bytes());

        let start = end;
        let end = start + USERNAME_SIZE;
        dst[start..end].copy_from_slice(&self.username);

        let start = end;
        let end = start + EMAIL_SIZE;
        dst[start..end].copy_from_slice(&self.email);
    }

    pub fn deserialize(src: &[u8]) -> Self {
        let start = 0;
        let end = ID_SIZE;
        let mut id_bytes = [0; ID_SIZE];
        id_bytes.copy_from_slice(&src[start..end]);
        let id = u32::from_le_bytes(id_bytes);

        let start = end;
        let end = start + USERNAME_SIZE;
        let mut username = [0; USERNAME_SIZE];
        username.copy_from_slice(&src[start..end]);

        let start = end;
        let end = start + EMAIL_SIZE;
        let mut email = [0; EMAIL_SIZE];
        email.copy_from_slice(&src[start..end]);

        Self {
            id,
            username,
            email,
        }
    }
}

impl FromStr for Row {
    type Err = PrepareError;

    fn from_str(args: &str) -> Result<Self, Self::Err> {
        let columns: Vec<&str> = args.split_whitespace().collect();

        if columns.len() > 3 {
            return Err(PrepareError::TooManyFields);
        }

        let [id_str, username, email] = columns[..] else {
            return Err(PrepareError::SyntaxError);
        };

        // The sign is checked on the raw token before attempting a u32
        // parse, so a negative id is reported distinctly rather than
        // folded into a generic parse failure.
        if id_str.starts_with('-') {
            return Err(PrepareError::NegativeId);
        }

        let id = id_str.parse::<u32>().map_err(|_| PrepareError::SyntaxError)?;

        if username.len() > USERNAME_SIZE || email.len() > EMAIL_SIZE {
            return Err(PrepareError::StringTooLong);
        }

        Row::new(id, username, email)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{id:{}, email:{}, user:{} }}",
            self.id,
            self.email(),
            self.username()
        )
    }
}
