//! Catalog Data

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: u64,
}

/// New Add-on Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddOnItem {
    pub name: String,
    pub price: u64,
    pub is_applicable: bool,
}

/// Add-on Item Update Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnItemUpdate {
    pub price: u64,
    pub is_applicable: bool,
}

/// New Charge Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharge {
    pub name: String,
    pub price: u64,
    pub is_applicable: bool,
}

/// Charge Update Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeUpdate {
    pub price: u64,
    pub is_applicable: bool,
}
