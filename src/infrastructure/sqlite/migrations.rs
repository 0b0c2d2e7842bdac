use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metric_records (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            month_label TEXT NOT NULL,
            source TEXT NOT NULL,
            client TEXT NOT NULL,
            product TEXT NOT NULL,
            audience_label TEXT NOT NULL,
            ad_set_id TEXT,
            campaign_id TEXT,
            ad_account_id TEXT,
            investment REAL NOT NULL DEFAULT 0,
            impressions INTEGER NOT NULL DEFAULT 0,
            clicks INTEGER NOT NULL DEFAULT 0,
            link_clicks INTEGER,
            leads INTEGER NOT NULL DEFAULT 0,
            sales INTEGER NOT NULL DEFAULT 0,
            result_count INTEGER,
            result_type TEXT,
            cpr REAL,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS audience_sales_details (
            month_label TEXT NOT NULL,
            product TEXT NOT NULL,
            audience_label TEXT NOT NULL,
            ad_set_id TEXT,
            sales INTEGER NOT NULL DEFAULT 0,
            appointments INTEGER NOT NULL DEFAULT 0,
            ticket_price REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (month_label, product, audience_label)
        );

        CREATE TABLE IF NOT EXISTS monthly_plan_details (
            month_label TEXT NOT NULL,
            product TEXT NOT NULL,
            client TEXT,
            sales INTEGER NOT NULL DEFAULT 0,
            ticket_price REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (month_label, product)
        );

        CREATE TABLE IF NOT EXISTS planner_groups (
            client TEXT NOT NULL,
            product TEXT NOT NULL,
            audience_label TEXT NOT NULL,
            ad_set_id TEXT NOT NULL,
            PRIMARY KEY (client, product, audience_label)
        );

        CREATE INDEX IF NOT EXISTS idx_records_product_client ON metric_records(product, client);
        CREATE INDEX IF NOT EXISTS idx_records_source ON metric_records(source);
        CREATE INDEX IF NOT EXISTS idx_details_month ON audience_sales_details(month_label, product);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
