use thiserror::Error;

use crate::pager::{Pager, PagerError};

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Pager(#[from] PagerError),
}

/// Owns one pager and identifies a root page.
pub struct Table {
    pub root_page_num: u32,
    pub pager: Pager,
}

impl Table {
    pub fn db_open(filename: &str) -> Result<Self, TableError> {
        let mut pager = Pager::pager_open(filename)?;

        if pager.num_pages == 0 {
            let root_node = pager.get_page(0)?;
            root_node.set_node_root(true);
            pager.num_pages = 1;
        }

        Ok(Self {
            root_page_num: 0,
            pager,
        })
    }

    pub fn db_close(&mut self) -> Result<(), TableError> {
        self.pager.pager_close()?;
        Ok(())
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        let _ = self.db_close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn opening_a_fresh_file_creates_a_single_root_leaf() {
        let file = NamedTempFile::new().unwrap();
        let table = Table::db_open(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.root_page_num, 0);
        assert_eq!(table.pager.num_pages, 1);
    }

    #[test]
    fn reopening_a_populated_file_does_not_replay_or_reset_state() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        {
            let mut table = Table::db_open(&path).unwrap();
            let node = table.pager.get_page(0).unwrap();
            *node.leaf_node_num_cells() = 3;
            table.db_close().unwrap();
        }

        let table = Table::db_open(&path).unwrap();
        assert_eq!(table.pager.num_pages, 1);
    }
}
