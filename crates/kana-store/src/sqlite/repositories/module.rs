//! Module repository — read access to the `modules` reference table.
//!
//! Modules are seeded from the built-in curriculum and never mutated at
//! runtime, so this repo is read-only.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::{CharacterRow, ModuleRow};

/// Module repository — stateless, every method takes `&Connection`.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Get a module by id, with its character count.
    pub fn get_by_id(conn: &Connection, module_id: &str) -> Result<Option<ModuleRow>> {
        let row = conn
            .query_row(
                "SELECT m.id, m.name, m.position,
                        (SELECT COUNT(*) FROM module_characters WHERE module_id = m.id) AS character_count
                 FROM modules m WHERE m.id = ?1",
                params![module_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List all modules in curriculum order.
    pub fn list(conn: &Connection) -> Result<Vec<ModuleRow>> {
        let mut stmt = conn.prepare(
            "SELECT m.id, m.name, m.position,
                    (SELECT COUNT(*) FROM module_characters WHERE module_id = m.id) AS character_count
             FROM modules m ORDER BY m.position ASC",
        )?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The module immediately preceding `position`, if any.
    pub fn get_by_position(conn: &Connection, position: i64) -> Result<Option<ModuleRow>> {
        let row = conn
            .query_row(
                "SELECT m.id, m.name, m.position,
                        (SELECT COUNT(*) FROM module_characters WHERE module_id = m.id) AS character_count
                 FROM modules m WHERE m.position = ?1",
                params![position],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Ordered characters of a module (per-module ordinal order).
    pub fn characters(conn: &Connection, module_id: &str) -> Result<Vec<CharacterRow>> {
        let mut stmt = conn.prepare(
            "SELECT c.id, c.glyph, c.reading, c.script, c.position
             FROM module_characters mc
             JOIN characters c ON c.id = mc.character_id
             WHERE mc.module_id = ?1
             ORDER BY mc.position ASC",
        )?;
        let rows = stmt
            .query_map(params![module_id], |row| {
                Ok(CharacterRow {
                    id: row.get(0)?,
                    glyph: row.get(1)?,
                    reading: row.get(2)?,
                    script: row.get(3)?,
                    position: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Whether a character belongs to a module.
    pub fn contains_character(
        conn: &Connection,
        module_id: &str,
        character_id: &str,
    ) -> Result<bool> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM module_characters WHERE module_id = ?1 AND character_id = ?2)",
            params![module_id, character_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ModuleRow> {
        Ok(ModuleRow {
            id: row.get(0)?,
            name: row.get(1)?,
            position: row.get(2)?,
            character_count: row.get(3)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::sqlite::repositories::test_support::setup;

    #[test]
    fn list_returns_curriculum_in_order() {
        let conn = setup();
        let modules = ModuleRepo::list(&conn).unwrap();
        assert_eq!(modules.len(), 10);
        assert_eq!(modules[0].id, "hiragana_1");
        assert_eq!(modules[0].position, 1);
        assert_eq!(modules[9].id, "katakana_5");
        assert_eq!(modules[9].position, 10);
    }

    #[test]
    fn get_by_id_includes_character_count() {
        let conn = setup();
        let module = ModuleRepo::get_by_id(&conn, "hiragana_1").unwrap().unwrap();
        assert_eq!(module.character_count, 10);
    }

    #[test]
    fn get_by_id_missing_is_none() {
        let conn = setup();
        assert!(ModuleRepo::get_by_id(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn characters_are_ordered() {
        let conn = setup();
        let chars = ModuleRepo::characters(&conn, "hiragana_1").unwrap();
        assert_eq!(chars.len(), 10);
        assert_eq!(chars[0].glyph, "あ");
        assert_eq!(chars[9].glyph, "こ");
    }

    #[test]
    fn characters_of_missing_module_empty() {
        let conn = setup();
        assert!(ModuleRepo::characters(&conn, "nope").unwrap().is_empty());
    }

    #[test]
    fn contains_character_checks_membership() {
        let conn = setup();
        assert!(ModuleRepo::contains_character(&conn, "hiragana_1", "hira_a").unwrap());
        assert!(!ModuleRepo::contains_character(&conn, "hiragana_1", "hira_ra").unwrap());
    }

    #[test]
    fn get_by_position_finds_predecessor() {
        let conn = setup();
        let second = ModuleRepo::get_by_id(&conn, "hiragana_2").unwrap().unwrap();
        let prev = ModuleRepo::get_by_position(&conn, second.position - 1)
            .unwrap()
            .unwrap();
        assert_eq!(prev.id, "hiragana_1");
    }
}
