use crate::error::{Error, Result, Validation};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_COMMENT_LENGTH: usize = 500;
pub const MAX_YEAR: u8 = 6;

pub fn email(email: &str) -> Result<()> {
    if db::is_valid_email(email) {
        Ok(())
    } else {
        Err(Error::InvalidEmail)
    }
}

pub fn password(password: &str, confirmation: &str) -> Result<()> {
    if password.chars().count() < db::MIN_PASSWORD_LENGTH {
        return Err(Error::WeakPassword);
    }

    if password != confirmation {
        return Err(Validation::PasswordsDoNotMatch.into());
    }

    Ok(())
}

pub fn names(name: &str, surname: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Validation::EmptyName.into());
    }

    if surname.trim().is_empty() {
        return Err(Validation::EmptySurname.into());
    }

    Ok(())
}

pub fn year(year: u8) -> Result<()> {
    if (1..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(Validation::InvalidYear.into())
    }
}

/// Checks a review before it is posted, returning the trimmed comment.
pub fn review(rating: u8, comment: &str) -> Result<String> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Validation::RatingOutOfRange.into());
    }

    let comment = comment.trim();

    if comment.is_empty() {
        return Err(Validation::EmptyComment.into());
    }

    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(Validation::CommentTooLong.into());
    }

    Ok(comment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords() {
        assert_eq!(password("123", "123"), Err(Error::WeakPassword));
        assert_eq!(
            password("secret1", "secret2"),
            Err(Validation::PasswordsDoNotMatch.into())
        );
        assert_eq!(password("secret1", "secret1"), Ok(()));
    }

    #[test]
    fn reviews() {
        assert_eq!(review(0, "fine"), Err(Validation::RatingOutOfRange.into()));
        assert_eq!(review(6, "fine"), Err(Validation::RatingOutOfRange.into()));
        assert_eq!(review(3, "   "), Err(Validation::EmptyComment.into()));
        assert_eq!(
            review(3, &"a".repeat(MAX_COMMENT_LENGTH + 1)),
            Err(Validation::CommentTooLong.into())
        );
        assert_eq!(review(5, "  great  "), Ok("great".to_string()));
    }

    #[test]
    fn profile_fields() {
        assert_eq!(names(" ", "Yilmaz"), Err(Validation::EmptyName.into()));
        assert_eq!(names("Ada", ""), Err(Validation::EmptySurname.into()));
        assert_eq!(year(0), Err(Validation::InvalidYear.into()));
        assert_eq!(year(4), Ok(()));
        assert_eq!(email("ada@uni"), Err(Error::InvalidEmail));
    }
}
