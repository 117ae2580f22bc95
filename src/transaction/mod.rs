//! Transactions record money that was earned or spent.

mod db;
mod domain;
mod handlers;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, insert_transaction, map_transaction_row, update_transaction,
};
pub use domain::{
    CreateTransactionData, MAX_DESCRIPTION_LENGTH, NewTransaction, Transaction, TransactionId,
    UpdateTransactionData,
};
pub use handlers::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    update_transaction_endpoint,
};
