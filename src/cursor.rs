use thiserror::Error;

use crate::{
    node::{Node, CELLS_PER_LEAF},
    row::Row,
    table::{Table, TableError},
};

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("table full")]
    TableFull,
}

/// A logical `(page, cell)` position into the table's root leaf.
pub struct Cursor<'a> {
    table: &'a mut Table,
    page_num: u32,
    cell_num: u32,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub fn table_start(table: &'a mut Table) -> Result<Self, ExecuteError> {
        let page_num = table.root_page_num;
        let root = table.pager.get_page(page_num)?;
        let num_cells = *root.leaf_node_num_cells();

        Ok(Self {
            table,
            page_num,
            cell_num: 0,
            end_of_table: num_cells == 0,
        })
    }

    pub fn table_end(table: &'a mut Table) -> Result<Self, ExecuteError> {
        let page_num = table.root_page_num;
        let root = table.pager.get_page(page_num)?;
        let num_cells = *root.leaf_node_num_cells();

        Ok(Self {
            table,
            page_num,
            cell_num: num_cells,
            end_of_table: true,
        })
    }

    fn node(&mut self) -> Result<&mut Node, ExecuteError> {
        Ok(self.table.pager.get_page(self.page_num)?)
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    pub fn value(&mut self) -> Result<&mut Row, ExecuteError> {
        let cell_num = self.cell_num;
        Ok(self.node()?.leaf_node_value(cell_num))
    }

    pub fn advance(&mut self) -> Result<(), ExecuteError> {
        self.cell_num += 1;
        let num_cells = *self.node()?.leaf_node_num_cells();
        if self.cell_num >= num_cells {
            self.end_of_table = true;
        }
        Ok(())
    }

    pub fn insert_row(&mut self, row: Row) -> Result<(), ExecuteError> {
        let cell_num = self.cell_num;
        let node = self.node()?;
        let num_cells = *node.leaf_node_num_cells();

        if num_cells as usize >= CELLS_PER_LEAF {
            return Err(ExecuteError::TableFull);
        }

        *node.leaf_node_key(cell_num) = row.id;
        *node.leaf_node_value(cell_num) = row;
        *node.leaf_node_num_cells() += 1;

        Ok(())
    }
}
