// ==========================================
// 人力资源管理系统 - 数据库建表
// ==========================================
// 职责: 初始化/校验本地 SQLite schema
// 说明: 生产环境由安装器建库;此处供 CLI 初始化与测试复用
// ==========================================

use rusqlite::Connection;

/// 初始化数据库 schema(幂等)
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        -- 组织记录: 键值记录库抽象的落地表
        CREATE TABLE IF NOT EXISTS org_record (
            record_id TEXT PRIMARY KEY,
            entity_type TEXT NOT NULL,
            company_code TEXT NOT NULL,
            code TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            batch_id TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_org_record_lookup
            ON org_record (entity_type, company_code, code);

        -- 导入批次: 唯一持久化工件
        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            entity_type TEXT NOT NULL,
            company_code TEXT NOT NULL,
            status TEXT NOT NULL,
            total_rows INTEGER NOT NULL DEFAULT 0,
            successful_records INTEGER NOT NULL DEFAULT 0,
            failed_records INTEGER NOT NULL DEFAULT 0,
            skipped_records INTEGER NOT NULL DEFAULT 0,
            imported_ids_json TEXT NOT NULL DEFAULT '[]',
            chunk_errors_json TEXT NOT NULL DEFAULT '[]',
            staging_json TEXT NOT NULL,
            validation_json TEXT NOT NULL,
            created_at TEXT NOT NULL,
            committed_at TEXT,
            rollback_eligible_until TEXT
        );

        -- 参照数据
        CREATE TABLE IF NOT EXISTS ref_currency (
            code TEXT PRIMARY KEY,
            display_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ref_lookup (
            category TEXT NOT NULL,
            code TEXT NOT NULL,
            display_name TEXT NOT NULL,
            PRIMARY KEY (category, code)
        );

        INSERT OR IGNORE INTO schema_version (version) VALUES (2);
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let version = crate::db::read_schema_version(&conn).unwrap();
        assert_eq!(version, Some(crate::db::CURRENT_SCHEMA_VERSION));
    }
}
