//! Character repository — read access to the `characters` reference table.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::CharacterRow;

/// Character repository — stateless, every method takes `&Connection`.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Get a character by id.
    pub fn get_by_id(conn: &Connection, character_id: &str) -> Result<Option<CharacterRow>> {
        let row = conn
            .query_row(
                "SELECT id, glyph, reading, script, position FROM characters WHERE id = ?1",
                params![character_id],
                |row| {
                    Ok(CharacterRow {
                        id: row.get(0)?,
                        glyph: row.get(1)?,
                        reading: row.get(2)?,
                        script: row.get(3)?,
                        position: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Count all characters.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::repositories::test_support::setup;

    #[test]
    fn get_by_id_returns_seeded_character() {
        let conn = setup();
        let ka = CharacterRepo::get_by_id(&conn, "hira_ka").unwrap().unwrap();
        assert_eq!(ka.glyph, "か");
        assert_eq!(ka.reading, "ka");
        assert_eq!(ka.script, "hiragana");
    }

    #[test]
    fn get_by_id_missing_is_none() {
        let conn = setup();
        assert!(CharacterRepo::get_by_id(&conn, "hira_zz").unwrap().is_none());
    }

    #[test]
    fn count_covers_both_syllabaries() {
        let conn = setup();
        assert_eq!(CharacterRepo::count(&conn).unwrap(), 92);
    }
}
