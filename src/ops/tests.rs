#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::db::Database;

fn setup() -> (Database, User) {
    let db = Database::open_in_memory().unwrap();
    let user = register_user(&db, "anna@example.com").unwrap();
    (db, user)
}

fn expense(amount: Decimal, item: &str, category: ExpenseCategory) -> ExpenseInput {
    ExpenseInput {
        date: Some("2024-02-10".into()),
        amount,
        item_name: item.into(),
        category,
        notes: None,
    }
}

fn income(amount: Decimal, source: IncomeSource) -> IncomeInput {
    IncomeInput {
        date: Some("2024-02-05".into()),
        amount,
        source,
        custom_source: None,
        notes: None,
    }
}

// ── Users & authentication ────────────────────────────────────

#[test]
fn test_register_and_resolve_user() {
    let (db, user) = setup();
    assert!(user.id.is_some());

    let resolved = resolve_user(&db, Some("anna@example.com")).unwrap();
    assert_eq!(resolved.id, user.id);
}

#[test]
fn test_resolve_without_identity_is_not_authenticated() {
    let (db, _user) = setup();

    let err = resolve_user(&db, None).unwrap_err();
    assert!(matches!(err, DomainError::NotAuthenticated));

    let err = resolve_user(&db, Some("senki@example.com")).unwrap_err();
    assert!(matches!(err, DomainError::NotAuthenticated));
}

#[test]
fn test_register_rejects_bad_email_and_duplicates() {
    let (db, _user) = setup();

    let err = register_user(&db, "nem-email").unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "email", .. }));

    let err = register_user(&db, "anna@example.com").unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[test]
fn test_operations_require_a_user_id() {
    let (db, _user) = setup();
    let ghost = User::new("ghost@example.com".into());

    let err = list_months(&db, &ghost).unwrap_err();
    assert!(matches!(err, DomainError::NotAuthenticated));
}

// ── Input parsing ─────────────────────────────────────────────

#[test]
fn test_parse_month_key() {
    assert_eq!(parse_month_key("2024-02").unwrap(), (2024, 2));
    assert_eq!(parse_month_key("2024-12").unwrap(), (2024, 12));

    for bad in ["2024", "2024-13", "2024-00", "24-02", "abcd-ef", ""] {
        assert!(
            matches!(
                parse_month_key(bad),
                Err(DomainError::Validation { field: "month", .. })
            ),
            "'{bad}' should be rejected"
        );
    }
}

#[test]
fn test_parse_amount_bounds() {
    assert_eq!(parse_amount("amount", "15000").unwrap(), dec!(15000));
    assert_eq!(parse_amount("amount", "0.01").unwrap(), dec!(0.01));
    assert_eq!(
        parse_amount("amount", "99999999.99").unwrap(),
        dec!(99999999.99)
    );

    assert!(parse_amount("amount", "-1").is_err());
    assert!(parse_amount("amount", "100000000").is_err());
    assert!(parse_amount("amount", "sok").is_err());
}

#[test]
fn test_parse_category_and_source() {
    assert_eq!(parse_category("Sport").unwrap(), ExpenseCategory::Sport);
    assert!(matches!(
        parse_category("Lakás"),
        Err(DomainError::Validation { field: "category", .. })
    ));

    assert_eq!(parse_source("Fizetés").unwrap(), IncomeSource::Salary);
    assert!(parse_source("lottó").is_err());
}

// ── Recording entries ─────────────────────────────────────────

#[test]
fn test_add_expense_creates_month_lazily() {
    let (db, user) = setup();
    assert!(list_months(&db, &user).unwrap().is_empty());

    add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(15000), "Edzőterem", ExpenseCategory::Sport),
    )
    .unwrap();

    let months = list_months(&db, &user).unwrap();
    assert_eq!(months.len(), 1);
    assert_eq!(months[0].key(), "2024-02");
}

#[test]
fn test_add_expense_validation() {
    let (db, user) = setup();

    let err = add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(-5), "Mozi", ExpenseCategory::Entertainment),
    )
    .unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "amount", .. }));

    let err = add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(5), "   ", ExpenseCategory::Entertainment),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation {
            field: "item_name",
            ..
        }
    ));

    let mut bad_date = expense(dec!(5), "Mozi", ExpenseCategory::Entertainment);
    bad_date.date = Some("02/10/2024".into());
    let err = add_expense(&db, &user, "2024-02", bad_date).unwrap_err();
    assert!(matches!(err, DomainError::Validation { field: "date", .. }));

    // Nothing reached the store
    assert!(list_expenses(&db, &user, "2024-02").unwrap().is_empty());
}

#[test]
fn test_add_income_with_custom_label() {
    let (db, user) = setup();
    let mut input = income(dec!(40000), IncomeSource::Other);
    input.custom_source = Some("Garázsvásár".into());
    let created = add_income(&db, &user, "2024-02", input).unwrap();
    assert_eq!(created.source_label(), "Garázsvásár");

    let listed = list_incomes(&db, &user, "2024-02").unwrap();
    assert_eq!(listed.len(), 1);
}

#[test]
fn test_remove_and_update_entries() {
    let (db, user) = setup();
    let created = add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(5000), "Mozi", ExpenseCategory::Entertainment),
    )
    .unwrap();
    let id = created.id.unwrap();

    update_expense_amount(&db, &user, id, dec!(5500)).unwrap();
    assert_eq!(
        list_expenses(&db, &user, "2024-02").unwrap()[0].amount,
        dec!(5500)
    );

    remove_expense(&db, &user, id).unwrap();
    assert!(list_expenses(&db, &user, "2024-02").unwrap().is_empty());

    let err = remove_expense(&db, &user, id).unwrap_err();
    assert!(matches!(err, DomainError::NotFound("expense")));
}

// ── Budgets vs spending ───────────────────────────────────────

#[test]
fn test_budget_progress_worked_example() {
    let (db, user) = setup();
    add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(15000), "Edzőterem", ExpenseCategory::Sport),
    )
    .unwrap();
    add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(5000), "Úszás", ExpenseCategory::Sport),
    )
    .unwrap();
    add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(20000), "Kabát", ExpenseCategory::Clothing),
    )
    .unwrap();

    set_budget(&db, &user, "2024-02", ExpenseCategory::Sport, dec!(25000)).unwrap();
    set_budget(&db, &user, "2024-02", ExpenseCategory::Clothing, dec!(10000)).unwrap();

    let overview = budget_overview_for_month(&db, &user, "2024-02").unwrap();
    assert_eq!(overview.budgets.len(), 2);

    let sport = &overview.budgets[0];
    assert_eq!(sport.spent, dec!(20000));
    assert_eq!(sport.remaining, dec!(5000));
    assert_eq!(sport.percentage, dec!(80));
    assert!(!sport.is_over_budget);

    let clothing = &overview.budgets[1];
    assert_eq!(clothing.spent, dec!(20000));
    assert_eq!(clothing.remaining, dec!(-10000));
    assert_eq!(clothing.percentage, dec!(200));
    assert!(clothing.is_over_budget);

    assert_eq!(overview.total_budget, dec!(35000));
    assert_eq!(overview.total_spent, dec!(40000));
    assert_eq!(overview.total_remaining, dec!(-5000));
    assert!(overview.is_over_budget);
}

#[test]
fn test_deleted_expenses_leave_aggregates() {
    let (db, user) = setup();
    let kept = add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(15000), "Edzőterem", ExpenseCategory::Sport),
    )
    .unwrap();
    let removed = add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(5000), "Úszás", ExpenseCategory::Sport),
    )
    .unwrap();
    set_budget(&db, &user, "2024-02", ExpenseCategory::Sport, dec!(25000)).unwrap();

    remove_expense(&db, &user, removed.id.unwrap()).unwrap();

    let budgets = budgets_for_month(&db, &user, "2024-02").unwrap();
    assert_eq!(budgets[0].spent, kept.amount);
}

#[test]
fn test_duplicate_budget_is_conflict_via_ops() {
    let (db, user) = setup();
    set_budget(&db, &user, "2024-02", ExpenseCategory::Sport, dec!(25000)).unwrap();

    let err =
        set_budget(&db, &user, "2024-02", ExpenseCategory::Sport, dec!(10000)).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(budgets_for_month(&db, &user, "2024-02").unwrap().len(), 1);
}

#[test]
fn test_replace_budgets_validation() {
    let (mut db, user) = setup();

    let err = replace_budgets(&mut db, &user, "2024-02", &[]).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation { field: "budgets", .. }
    ));

    let err = replace_budgets(
        &mut db,
        &user,
        "2024-02",
        &[
            (ExpenseCategory::Sport, dec!(1000)),
            (ExpenseCategory::Sport, dec!(2000)),
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation { field: "budgets", .. }
    ));
}

#[test]
fn test_replace_budgets_intent_idempotence() {
    let (mut db, user) = setup();
    let entries = [
        (ExpenseCategory::Sport, dec!(25000)),
        (ExpenseCategory::Groceries, dec!(80000)),
    ];

    let first = replace_budgets(&mut db, &user, "2024-02", &entries).unwrap();
    let second = replace_budgets(&mut db, &user, "2024-02", &entries).unwrap();

    assert!(first
        .iter()
        .all(|a| second.iter().all(|b| a.id != b.id)));

    let listed = budgets_for_month(&db, &user, "2024-02").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].budget.category, ExpenseCategory::Sport);
    assert_eq!(listed[0].budget.budget_amount, dec!(25000));
    assert_eq!(listed[1].budget.category, ExpenseCategory::Groceries);
    assert_eq!(listed[1].budget.budget_amount, dec!(80000));
}

#[test]
fn test_edit_budget_not_owned_is_not_found() {
    let (db, user) = setup();
    let other = register_user(&db, "bela@example.com").unwrap();
    let theirs = set_budget(&db, &other, "2024-02", ExpenseCategory::Sport, dec!(1000)).unwrap();

    let err = edit_budget(&db, &user, theirs.id.unwrap(), dec!(2000)).unwrap_err();
    assert!(matches!(err, DomainError::NotFound("budget")));
}

// ── Month summary ─────────────────────────────────────────────

#[test]
fn test_month_summary_combines_all_parts() {
    let (db, user) = setup();
    set_starting_balance(&db, &user, "2024-02", dec!(10000)).unwrap();
    add_income(&db, &user, "2024-02", income(dec!(250000), IncomeSource::Salary)).unwrap();
    add_income(&db, &user, "2024-02", income(dec!(50000), IncomeSource::Transfer)).unwrap();
    add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(80000), "Nagybevásárlás", ExpenseCategory::Groceries),
    )
    .unwrap();

    let summary = month_summary(&db, &user, "2024-02").unwrap();
    assert_eq!(summary.starting_balance, dec!(10000));
    assert_eq!(summary.total_income, dec!(300000));
    assert_eq!(summary.total_expenses, dec!(80000));
    assert_eq!(summary.balance, dec!(230000));
}

#[test]
fn test_month_summary_for_fresh_month_is_zero() {
    let (db, user) = setup();
    let summary = month_summary(&db, &user, "2030-01").unwrap();
    assert_eq!(summary.balance, Decimal::ZERO);
    assert_eq!(summary.total_income, Decimal::ZERO);
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_month_writes_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (db, user) = setup();
    add_income(&db, &user, "2024-02", income(dec!(250000), IncomeSource::Salary)).unwrap();
    add_expense(
        &db,
        &user,
        "2024-02",
        expense(dec!(15000), "Edzőterem", ExpenseCategory::Sport),
    )
    .unwrap();

    let path = dir.path().join("export.csv");
    let count = export_month(&db, &user, "2024-02", path.to_str().unwrap()).unwrap();
    assert_eq!(count, 2);
}
