//! Candidate records mapped out of parsed rows, before validation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::table::ParsedRow;

/// Which kind of records an upload carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Customers,
    Transactions,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Customers => "customers",
            RecordKind::Transactions => "transactions",
        }
    }
}

/// Loosely-typed transaction candidate; values are rendered cell strings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub customer_ref: Option<String>,
    pub folio_number: Option<String>,
    pub scheme_code: Option<String>,
    pub scheme_name: Option<String>,
    pub txn_type: Option<String>,
    pub txn_date: Option<String>,
    pub amount: Option<String>,
    pub units: Option<String>,
    pub nav: Option<String>,
    pub stamp_duty: Option<String>,
    /// Columns no alias claimed, preserved for audit output
    pub extra: HashMap<String, String>,
}

/// Loosely-typed customer candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pan: Option<String>,
    pub folio_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub date_of_birth: Option<String>,
    pub extra: HashMap<String, String>,
}

// === Header alias tables ===
//
// Entries are squeezed forms (lowercase, alphanumeric only); list order is
// match priority. "Total Amount (₹)" and "total_amount" both squeeze to
// "totalamount".

const TXN_CUSTOMER_ALIASES: &[&str] = &[
    "customerref", "customerreference", "customerid", "customeremail", "customer", "clientid",
    "investorid", "email", "pan",
];
const TXN_FOLIO_ALIASES: &[&str] = &["folionumber", "foliono", "folio"];
const TXN_SCHEME_CODE_ALIASES: &[&str] = &["schemecode", "fundcode", "scheme"];
const TXN_SCHEME_NAME_ALIASES: &[&str] = &["schemename", "fundname", "schemedescription"];
const TXN_TYPE_ALIASES: &[&str] = &["transactiontype", "txntype", "trantype", "type"];
const TXN_DATE_ALIASES: &[&str] = &["transactiondate", "txndate", "tradedate", "valuedate", "date"];
const TXN_AMOUNT_ALIASES: &[&str] = &[
    "totalamount", "transactionamount", "txnamount", "grossamount", "netamount", "amount",
];
const TXN_UNITS_ALIASES: &[&str] = &["noofunits", "units", "unit", "quantity", "qty"];
const TXN_NAV_ALIASES: &[&str] = &["navrate", "navvalue", "nav", "price"];
const TXN_STAMP_DUTY_ALIASES: &[&str] = &["stampdutyamount", "stampduty", "duty"];

const CUST_NAME_ALIASES: &[&str] = &[
    "customername", "investorname", "applicantname", "fullname", "name",
];
const CUST_EMAIL_ALIASES: &[&str] = &["emailid", "emailaddress", "email", "mail"];
const CUST_PHONE_ALIASES: &[&str] = &[
    "phonenumber", "mobilenumber", "contactnumber", "phone", "mobile", "contact",
];
const CUST_PAN_ALIASES: &[&str] = &["pannumber", "pancard", "panno", "pan"];
const CUST_FOLIO_ALIASES: &[&str] = &["folionumber", "foliono", "folio"];
const CUST_ADDRESS_ALIASES: &[&str] = &["addressline1", "address1", "address"];
const CUST_CITY_ALIASES: &[&str] = &["city"];
const CUST_STATE_ALIASES: &[&str] = &["state"];
const CUST_PINCODE_ALIASES: &[&str] = &["pincode", "postalcode", "zipcode", "zip", "pin"];
const CUST_DOB_ALIASES: &[&str] = &["dateofbirth", "birthdate", "dob"];

/// Build a transaction draft from one parsed row.
///
/// `headers` carries the column order; alias resolution scans it in order
/// so the outcome never depends on map iteration order.
pub fn map_transaction_row(row: &ParsedRow, headers: &[String]) -> TransactionDraft {
    let mut claimed: Vec<&String> = Vec::new();
    let mut take = |aliases: &[&str]| pick_field(row, headers, aliases, &mut claimed);

    let mut draft = TransactionDraft {
        customer_ref: take(TXN_CUSTOMER_ALIASES),
        folio_number: take(TXN_FOLIO_ALIASES).map(|v| v.to_uppercase()),
        scheme_code: take(TXN_SCHEME_CODE_ALIASES).map(normalize_code),
        scheme_name: take(TXN_SCHEME_NAME_ALIASES),
        txn_type: take(TXN_TYPE_ALIASES),
        txn_date: take(TXN_DATE_ALIASES),
        amount: take(TXN_AMOUNT_ALIASES),
        units: take(TXN_UNITS_ALIASES),
        nav: take(TXN_NAV_ALIASES),
        stamp_duty: take(TXN_STAMP_DUTY_ALIASES),
        extra: HashMap::new(),
    };
    draft.extra = collect_extra(row, headers, &claimed);
    draft
}

/// Build a customer draft from one parsed row
pub fn map_customer_row(row: &ParsedRow, headers: &[String]) -> CustomerDraft {
    let mut claimed: Vec<&String> = Vec::new();
    let mut take = |aliases: &[&str]| pick_field(row, headers, aliases, &mut claimed);

    let mut draft = CustomerDraft {
        name: take(CUST_NAME_ALIASES),
        email: take(CUST_EMAIL_ALIASES).map(|v| v.to_lowercase()),
        phone: take(CUST_PHONE_ALIASES),
        pan: take(CUST_PAN_ALIASES).map(|v| v.to_uppercase()),
        folio_number: take(CUST_FOLIO_ALIASES).map(|v| v.to_uppercase()),
        address: take(CUST_ADDRESS_ALIASES),
        city: take(CUST_CITY_ALIASES),
        state: take(CUST_STATE_ALIASES),
        pincode: take(CUST_PINCODE_ALIASES),
        date_of_birth: take(CUST_DOB_ALIASES),
        extra: HashMap::new(),
    };
    draft.extra = collect_extra(row, headers, &claimed);
    draft
}

/// Resolve one field: first alias that matches a header, in header order,
/// wins. Claims the header so later fields and `extra` skip it.
fn pick_field<'a>(
    row: &ParsedRow,
    headers: &'a [String],
    aliases: &[&str],
    claimed: &mut Vec<&'a String>,
) -> Option<String> {
    for alias in aliases {
        for header in headers {
            if claimed.iter().any(|c| *c == header) {
                continue;
            }
            if squeeze(header) == *alias {
                claimed.push(header);
                let value = row.get(header).filter(|c| !c.is_empty())?.render();
                return Some(value);
            }
        }
    }
    None
}

fn collect_extra(
    row: &ParsedRow,
    headers: &[String],
    claimed: &[&String],
) -> HashMap<String, String> {
    let mut extra = HashMap::new();
    for header in headers {
        if claimed.iter().any(|c| *c == header) {
            continue;
        }
        if let Some(cell) = row.get(header) {
            if !cell.is_empty() {
                extra.insert(header.clone(), cell.render());
            }
        }
    }
    extra
}

/// Lowercase, alphanumeric-only form used for header matching
fn squeeze(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Upper-case and strip all whitespace (scheme codes)
fn normalize_code(s: String) -> String {
    s.split_whitespace().collect::<String>().to_uppercase()
}
