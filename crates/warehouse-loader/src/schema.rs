//! Warehouse table definitions for the generated shop dataset.
//!
//! Each [`TableDefinition`] names its source CSV, its typed columns and its
//! keys. Definitions are static; [`LOAD_ORDER`] lists them in the order the
//! loader replaces them so that referenced tables exist first.

use shop_data::output::{AD_PERFORMANCE_FILE, CUSTOMERS_FILE, ORDERS_FILE, SESSIONS_FILE};

/// Database the tables live in unless configured otherwise.
pub const DEFAULT_DATABASE: &str = "ecommerce_raw";

/// Column holding the ingestion timestamp.
pub const LOADED_AT_COLUMN: &str = "_loaded_at";

/// Warehouse column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 32-bit signed integer.
    Integer,
    /// Text of at most the given number of characters.
    Varchar(usize),
    /// Timestamp without time zone.
    Timestamp,
    /// Calendar date.
    Date,
    /// Fixed-point decimal.
    Numeric {
        /// Total significant digits.
        precision: u32,
        /// Digits after the decimal point.
        scale: u32,
    },
}

impl ColumnType {
    /// Renders the type as SQL.
    #[must_use]
    pub fn sql(self) -> String {
        match self {
            Self::Integer => "INTEGER".to_owned(),
            Self::Varchar(length) => format!("VARCHAR({length})"),
            Self::Timestamp => "TIMESTAMP".to_owned(),
            Self::Date => "DATE".to_owned(),
            Self::Numeric { precision, scale } => format!("NUMERIC({precision},{scale})"),
        }
    }
}

/// How a column treats missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    /// Every row must carry a value.
    Required,
    /// Empty cells are stored as NULL.
    Nullable,
    /// Empty cells are filled with the load time.
    DefaultsToLoadTime,
}

/// One typed warehouse column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name, matching the CSV header case-insensitively.
    pub name: &'static str,
    /// Storage type.
    pub column_type: ColumnType,
    /// Missing-value policy.
    pub nullability: Nullability,
}

impl ColumnDefinition {
    const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullability: Nullability::Required,
        }
    }

    const fn nullable(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullability: Nullability::Nullable,
        }
    }

    const fn loaded_at() -> Self {
        Self {
            name: LOADED_AT_COLUMN,
            column_type: ColumnType::Timestamp,
            nullability: Nullability::DefaultsToLoadTime,
        }
    }

    fn sql(&self) -> String {
        let constraint = match self.nullability {
            Nullability::Required => " NOT NULL",
            Nullability::Nullable => "",
            Nullability::DefaultsToLoadTime => " DEFAULT CURRENT_TIMESTAMP",
        };
        format!(
            "{} {}{constraint}",
            quote_ident(self.name),
            self.column_type.sql()
        )
    }
}

/// A foreign key from one column to a column of another table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referencing column in the owning table.
    pub column: &'static str,
    /// Schema of the referenced table.
    pub references_schema: &'static str,
    /// Referenced table.
    pub references_table: &'static str,
    /// Referenced column.
    pub references_column: &'static str,
}

/// A warehouse table and the CSV file that feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDefinition {
    /// Schema grouping the table by source system.
    pub schema: &'static str,
    /// Table name.
    pub name: &'static str,
    /// CSV file, relative to the data directory.
    pub source_file: &'static str,
    /// Descriptive table comment.
    pub comment: &'static str,
    /// Columns in storage order.
    pub columns: &'static [ColumnDefinition],
    /// Primary-key columns.
    pub primary_key: &'static [&'static str],
    /// Foreign keys.
    pub foreign_keys: &'static [ForeignKey],
}

impl TableDefinition {
    /// Returns `schema.table`, for logs and error messages.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Returns the quoted `"schema"."table"` identifier.
    #[must_use]
    pub fn quoted_name(&self) -> String {
        format!("{}.{}", quote_ident(self.schema), quote_ident(self.name))
    }

    /// Renders the `CREATE TABLE` statement including key constraints.
    ///
    /// # Example
    ///
    /// ```
    /// use warehouse_loader::schema::AD_PERFORMANCE;
    ///
    /// let sql = AD_PERFORMANCE.create_table_sql();
    /// assert!(sql.starts_with("CREATE TABLE \"facebook_ads\".\"ad_performance\" ("));
    /// assert!(sql.contains("PRIMARY KEY (\"ad_id\", \"date\")"));
    /// ```
    #[must_use]
    pub fn create_table_sql(&self) -> String {
        let mut lines: Vec<String> = self.columns.iter().map(ColumnDefinition::sql).collect();
        if !self.primary_key.is_empty() {
            lines.push(format!("PRIMARY KEY ({})", quote_list(self.primary_key)));
        }
        lines.extend(self.foreign_keys.iter().map(|key| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {}.{} ({})",
                quote_ident(key.column),
                quote_ident(key.references_schema),
                quote_ident(key.references_table),
                quote_ident(key.references_column)
            )
        }));

        format!(
            "CREATE TABLE {} (\n    {}\n)",
            self.quoted_name(),
            lines.join(",\n    ")
        )
    }

    /// Renders the `COMMENT ON TABLE` statement.
    #[must_use]
    pub fn comment_sql(&self) -> String {
        format!(
            "COMMENT ON TABLE {} IS {}",
            self.quoted_name(),
            quote_literal(self.comment)
        )
    }

    /// Column names in storage order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + use<> {
        let columns = self.columns;
        columns.iter().map(|column| column.name)
    }
}

/// Quotes an SQL identifier, doubling embedded quotes.
#[must_use]
pub fn quote_ident(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quote_list(identifiers: &[&str]) -> String {
    identifiers
        .iter()
        .map(|identifier| quote_ident(identifier))
        .collect::<Vec<_>>()
        .join(", ")
}

const MONEY: ColumnType = ColumnType::Numeric {
    precision: 10,
    scale: 2,
};

/// Customer master data.
pub const CUSTOMERS: TableDefinition = TableDefinition {
    schema: "shopify",
    name: "customers",
    source_file: CUSTOMERS_FILE,
    comment: "Customer master data from Shopify",
    columns: &[
        ColumnDefinition::required("customer_id", ColumnType::Integer),
        ColumnDefinition::required("email", ColumnType::Varchar(255)),
        ColumnDefinition::required("first_name", ColumnType::Varchar(100)),
        ColumnDefinition::required("last_name", ColumnType::Varchar(100)),
        ColumnDefinition::required("country", ColumnType::Varchar(100)),
        ColumnDefinition::required("created_at", ColumnType::Timestamp),
        ColumnDefinition::required("updated_at", ColumnType::Timestamp),
        ColumnDefinition::loaded_at(),
    ],
    primary_key: &["customer_id"],
    foreign_keys: &[],
};

/// Order transactions.
pub const ORDERS: TableDefinition = TableDefinition {
    schema: "shopify",
    name: "orders",
    source_file: ORDERS_FILE,
    comment: "Order transactions from Shopify",
    columns: &[
        ColumnDefinition::required("order_id", ColumnType::Integer),
        ColumnDefinition::required("customer_id", ColumnType::Integer),
        ColumnDefinition::required("order_date", ColumnType::Timestamp),
        ColumnDefinition::required("total_amount", MONEY),
        ColumnDefinition::required("status", ColumnType::Varchar(50)),
        ColumnDefinition::required("created_at", ColumnType::Timestamp),
        ColumnDefinition::required("updated_at", ColumnType::Timestamp),
        ColumnDefinition::loaded_at(),
    ],
    primary_key: &["order_id"],
    foreign_keys: &[ForeignKey {
        column: "customer_id",
        references_schema: "shopify",
        references_table: "customers",
        references_column: "customer_id",
    }],
};

/// Web-analytics sessions.
pub const SESSIONS: TableDefinition = TableDefinition {
    schema: "google_analytics",
    name: "sessions",
    source_file: SESSIONS_FILE,
    comment: "Website session data from Google Analytics",
    columns: &[
        ColumnDefinition::required("session_id", ColumnType::Varchar(100)),
        ColumnDefinition::required("user_id", ColumnType::Varchar(100)),
        ColumnDefinition::required("session_date", ColumnType::Timestamp),
        ColumnDefinition::required("page_views", ColumnType::Integer),
        ColumnDefinition::required("session_duration_seconds", ColumnType::Integer),
        ColumnDefinition::required("source", ColumnType::Varchar(100)),
        ColumnDefinition::required("medium", ColumnType::Varchar(100)),
        ColumnDefinition::nullable("campaign", ColumnType::Varchar(200)),
        ColumnDefinition::loaded_at(),
    ],
    primary_key: &["session_id"],
    foreign_keys: &[],
};

/// Daily ad metrics.
pub const AD_PERFORMANCE: TableDefinition = TableDefinition {
    schema: "facebook_ads",
    name: "ad_performance",
    source_file: AD_PERFORMANCE_FILE,
    comment: "Daily ad performance metrics from Facebook Ads",
    columns: &[
        ColumnDefinition::required("ad_id", ColumnType::Varchar(50)),
        ColumnDefinition::required("date", ColumnType::Date),
        ColumnDefinition::required("impressions", ColumnType::Integer),
        ColumnDefinition::required("clicks", ColumnType::Integer),
        ColumnDefinition::required("spend", MONEY),
        ColumnDefinition::required("conversions", ColumnType::Integer),
        ColumnDefinition::loaded_at(),
    ],
    primary_key: &["ad_id", "date"],
    foreign_keys: &[],
};

/// Tables in load order; referenced tables come first.
pub const LOAD_ORDER: [&TableDefinition; 4] = [&CUSTOMERS, &ORDERS, &SESSIONS, &AD_PERFORMANCE];

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ColumnType::Integer, "INTEGER")]
    #[case(ColumnType::Varchar(255), "VARCHAR(255)")]
    #[case(ColumnType::Timestamp, "TIMESTAMP")]
    #[case(ColumnType::Date, "DATE")]
    #[case(MONEY, "NUMERIC(10,2)")]
    fn column_types_render_as_sql(#[case] column_type: ColumnType, #[case] expected: &str) {
        assert_eq!(column_type.sql(), expected);
    }

    #[test]
    fn orders_ddl_carries_keys_and_load_time_default() {
        let expected = concat!(
            "CREATE TABLE \"shopify\".\"orders\" (\n",
            "    \"order_id\" INTEGER NOT NULL,\n",
            "    \"customer_id\" INTEGER NOT NULL,\n",
            "    \"order_date\" TIMESTAMP NOT NULL,\n",
            "    \"total_amount\" NUMERIC(10,2) NOT NULL,\n",
            "    \"status\" VARCHAR(50) NOT NULL,\n",
            "    \"created_at\" TIMESTAMP NOT NULL,\n",
            "    \"updated_at\" TIMESTAMP NOT NULL,\n",
            "    \"_loaded_at\" TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n",
            "    PRIMARY KEY (\"order_id\"),\n",
            "    FOREIGN KEY (\"customer_id\") REFERENCES \"shopify\".\"customers\" (\"customer_id\")\n",
            ")"
        );
        assert_eq!(ORDERS.create_table_sql(), expected);
    }

    #[test]
    fn campaign_is_the_only_nullable_column() {
        let nullable: Vec<String> = LOAD_ORDER
            .iter()
            .flat_map(|table| {
                table
                    .columns
                    .iter()
                    .filter(|column| column.nullability == Nullability::Nullable)
                    .map(|column| format!("{}.{}", table.qualified_name(), column.name))
            })
            .collect();
        assert_eq!(nullable, vec!["google_analytics.sessions.campaign"]);
    }

    #[test]
    fn every_table_ends_with_the_load_timestamp() {
        for table in LOAD_ORDER {
            assert_eq!(table.column_names().last(), Some(LOADED_AT_COLUMN));
        }
    }

    #[test]
    fn referenced_tables_load_first() {
        let position = |name: &str| {
            LOAD_ORDER
                .iter()
                .position(|table| table.qualified_name() == name)
        };
        for table in LOAD_ORDER {
            for key in table.foreign_keys {
                let referenced = format!("{}.{}", key.references_schema, key.references_table);
                let referenced_at = position(&referenced).expect("referenced table is loaded");
                assert!(Some(referenced_at) < position(&table.qualified_name()));
            }
        }
    }

    #[test]
    fn comments_escape_single_quotes() {
        let table = TableDefinition {
            comment: "Shop's orders",
            ..ORDERS
        };
        assert_eq!(
            table.comment_sql(),
            "COMMENT ON TABLE \"shopify\".\"orders\" IS 'Shop''s orders'"
        );
    }

    #[test]
    fn identifiers_double_embedded_quotes() {
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
