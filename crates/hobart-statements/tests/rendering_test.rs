//! Integration tests for statement rendering against a 10-Q style fixture.

use chrono::NaiveDate;
use hobart_statements::{
    StatementOptions, checks, render_statement, resolve_statement_role, stitch_statements,
    StitchOptions,
};
use hobart_xbrl::{PeriodKey, QName, StatementType, StaticResolver, parse_filing};
use rust_decimal::Decimal;

const SCHEMA: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:abc="http://www.example.com/20230930"
    targetNamespace="http://www.example.com/20230930">
  <xs:annotation><xs:appinfo>
    <link:linkbaseRef xlink:href="abc_pre.xml"/>
    <link:linkbaseRef xlink:href="abc_cal.xml"/>
    <link:linkbaseRef xlink:href="abc_def.xml"/>
    <link:linkbaseRef xlink:href="abc_lab.xml"/>
    <link:roleType roleURI="http://www.example.com/role/ConsolidatedBalanceSheets" id="r1">
      <link:definition>0000002 - Statement - CONSOLIDATED BALANCE SHEETS</link:definition>
    </link:roleType>
    <link:roleType roleURI="http://www.example.com/role/ConsolidatedStatementsOfIncome" id="r2">
      <link:definition>0000003 - Statement - CONSOLIDATED STATEMENTS OF INCOME</link:definition>
    </link:roleType>
    <link:roleType roleURI="http://www.example.com/role/ConsolidatedStatementsOfComprehensiveIncomeLoss" id="r3">
      <link:definition>0000004 - Statement - CONSOLIDATED STATEMENTS OF COMPREHENSIVE INCOME (LOSS)</link:definition>
    </link:roleType>
  </xs:appinfo></xs:annotation>
  <xs:element name="StatementOfFinancialPositionAbstract" id="us-gaap_StatementOfFinancialPositionAbstract"
      abstract="true" substitutionGroup="xbrli:item" xbrli:periodType="duration"/>
  <xs:element name="IncomeStatementAbstract" id="us-gaap_IncomeStatementAbstract"
      abstract="true" substitutionGroup="xbrli:item" xbrli:periodType="duration"/>
  <xs:element name="Assets" id="us-gaap_Assets" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="debit" xbrli:periodType="instant"/>
  <xs:element name="Liabilities" id="us-gaap_Liabilities" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="credit" xbrli:periodType="instant"/>
  <xs:element name="StockholdersEquity" id="us-gaap_StockholdersEquity" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="credit" xbrli:periodType="instant"/>
  <xs:element name="LongTermDebt" id="us-gaap_LongTermDebt" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="credit" xbrli:periodType="instant"/>
  <xs:element name="Revenues" id="us-gaap_Revenues" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="credit" xbrli:periodType="duration"/>
  <xs:element name="CostOfRevenue" id="us-gaap_CostOfRevenue" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="debit" xbrli:periodType="duration"/>
  <xs:element name="GrossProfit" id="us-gaap_GrossProfit" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="credit" xbrli:periodType="duration"/>
  <xs:element name="ComprehensiveIncomeNetOfTax" id="us-gaap_ComprehensiveIncomeNetOfTax" type="xbrli:monetaryItemType"
      substitutionGroup="xbrli:item" xbrli:balance="credit" xbrli:periodType="duration"/>
  <xs:element name="StatementTable" id="us-gaap_StatementTable" abstract="true"
      substitutionGroup="xbrldt:hypercubeItem" xbrli:periodType="duration"/>
  <xs:element name="StatementLineItems" id="us-gaap_StatementLineItems" abstract="true"
      substitutionGroup="xbrli:item" xbrli:periodType="duration"/>
  <xs:element name="RelatedPartyTransactionsByRelatedPartyAxis" id="us-gaap_RelatedPartyTransactionsByRelatedPartyAxis"
      abstract="true" substitutionGroup="xbrldt:dimensionItem" xbrli:periodType="duration"/>
  <xs:element name="RelatedPartyDomain" id="us-gaap_RelatedPartyDomain" abstract="true"
      substitutionGroup="xbrli:item" xbrli:periodType="duration"/>
  <xs:element name="JointVentureMember" id="abc_JointVentureMember" abstract="true"
      substitutionGroup="xbrli:item" xbrli:periodType="duration"/>
</xs:schema>"#;

const PRE: &str = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:presentationLink xlink:role="http://www.example.com/role/ConsolidatedBalanceSheets">
    <link:loc xlink:label="root" xlink:href="abc.xsd#us-gaap_StatementOfFinancialPositionAbstract"/>
    <link:loc xlink:label="assets" xlink:href="abc.xsd#us-gaap_Assets"/>
    <link:loc xlink:label="debt" xlink:href="abc.xsd#us-gaap_LongTermDebt"/>
    <link:loc xlink:label="liabilities" xlink:href="abc.xsd#us-gaap_Liabilities"/>
    <link:loc xlink:label="equity" xlink:href="abc.xsd#us-gaap_StockholdersEquity"/>
    <link:presentationArc xlink:from="root" xlink:to="assets" order="1"/>
    <link:presentationArc xlink:from="root" xlink:to="debt" order="2"/>
    <link:presentationArc xlink:from="root" xlink:to="liabilities" order="3"/>
    <link:presentationArc xlink:from="root" xlink:to="equity" order="4"/>
  </link:presentationLink>
  <link:presentationLink xlink:role="http://www.example.com/role/ConsolidatedStatementsOfIncome">
    <link:loc xlink:label="root" xlink:href="abc.xsd#us-gaap_IncomeStatementAbstract"/>
    <link:loc xlink:label="revenues" xlink:href="abc.xsd#us-gaap_Revenues"/>
    <link:loc xlink:label="cost" xlink:href="abc.xsd#us-gaap_CostOfRevenue"/>
    <link:loc xlink:label="gross" xlink:href="abc.xsd#us-gaap_GrossProfit"/>
    <link:presentationArc xlink:from="root" xlink:to="revenues" order="1"/>
    <link:presentationArc xlink:from="root" xlink:to="cost" order="2"
        preferredLabel="http://www.xbrl.org/2009/role/negatedLabel"/>
    <link:presentationArc xlink:from="root" xlink:to="gross" order="3"
        preferredLabel="http://www.xbrl.org/2003/role/totalLabel"/>
  </link:presentationLink>
  <link:presentationLink xlink:role="http://www.example.com/role/ConsolidatedStatementsOfComprehensiveIncomeLoss">
    <link:loc xlink:label="root" xlink:href="abc.xsd#us-gaap_IncomeStatementAbstract"/>
    <link:loc xlink:label="ci" xlink:href="abc.xsd#us-gaap_ComprehensiveIncomeNetOfTax"/>
    <link:presentationArc xlink:from="root" xlink:to="ci" order="1"/>
  </link:presentationLink>
</link:linkbase>"#;

const CAL: &str = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:calculationLink xlink:role="http://www.example.com/role/ConsolidatedStatementsOfIncome">
    <link:loc xlink:label="gross" xlink:href="abc.xsd#us-gaap_GrossProfit"/>
    <link:loc xlink:label="revenues" xlink:href="abc.xsd#us-gaap_Revenues"/>
    <link:loc xlink:label="cost" xlink:href="abc.xsd#us-gaap_CostOfRevenue"/>
    <link:calculationArc xlink:from="gross" xlink:to="revenues" weight="1.0" order="1"/>
    <link:calculationArc xlink:from="gross" xlink:to="cost" weight="-1.0" order="2"/>
  </link:calculationLink>
</link:linkbase>"#;

const DEF: &str = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:definitionLink xlink:role="http://www.example.com/role/ConsolidatedBalanceSheets">
    <link:loc xlink:label="items" xlink:href="abc.xsd#us-gaap_StatementLineItems"/>
    <link:loc xlink:label="table" xlink:href="abc.xsd#us-gaap_StatementTable"/>
    <link:loc xlink:label="axis" xlink:href="abc.xsd#us-gaap_RelatedPartyTransactionsByRelatedPartyAxis"/>
    <link:loc xlink:label="domain" xlink:href="abc.xsd#us-gaap_RelatedPartyDomain"/>
    <link:loc xlink:label="member" xlink:href="abc.xsd#abc_JointVentureMember"/>
    <link:loc xlink:label="debt" xlink:href="abc.xsd#us-gaap_LongTermDebt"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/all"
        xlink:from="items" xlink:to="table" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/hypercube-dimension"
        xlink:from="table" xlink:to="axis" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/dimension-domain"
        xlink:from="axis" xlink:to="domain" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="domain" xlink:to="member" order="1"/>
    <link:definitionArc xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="items" xlink:to="debt" order="1"/>
  </link:definitionLink>
</link:linkbase>"#;

const LAB: &str = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:xml="http://www.w3.org/XML/1998/namespace">
  <link:labelLink xlink:role="http://www.xbrl.org/2003/role/link">
    <link:loc xlink:label="revenues" xlink:href="abc.xsd#us-gaap_Revenues"/>
    <link:label xlink:label="lab_rev" xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="en-US">Net revenue</link:label>
    <link:labelArc xlink:from="revenues" xlink:to="lab_rev"/>
    <link:loc xlink:label="gross" xlink:href="abc.xsd#us-gaap_GrossProfit"/>
    <link:label xlink:label="lab_gross" xlink:role="http://www.xbrl.org/2003/role/totalLabel" xml:lang="en-US">Total gross profit</link:label>
    <link:label xlink:label="lab_gross" xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="en-US">Gross profit</link:label>
    <link:labelArc xlink:from="gross" xlink:to="lab_gross"/>
    <link:loc xlink:label="member" xlink:href="abc.xsd#abc_JointVentureMember"/>
    <link:label xlink:label="lab_member" xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="en-US">Joint Venture</link:label>
    <link:labelArc xlink:from="member" xlink:to="lab_member"/>
  </link:labelLink>
</link:linkbase>"#;

const INSTANCE: &str = r#"<?xml version="1.0"?>
<xbrl xmlns="http://www.xbrl.org/2003/instance"
    xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:xbrldi="http://xbrl.org/2006/xbrldi"
    xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:us-gaap="http://fasb.org/us-gaap/2023"
    xmlns:abc="http://www.example.com/20230930"
    xmlns:dei="http://xbrl.sec.gov/dei/2023">
  <link:schemaRef xlink:href="abc.xsd"/>
  <context id="q3_2023">
    <entity><identifier scheme="http://www.sec.gov/CIK">0001234567</identifier></entity>
    <period><startDate>2023-07-01</startDate><endDate>2023-09-30</endDate></period>
  </context>
  <context id="q3_2022">
    <entity><identifier scheme="http://www.sec.gov/CIK">0001234567</identifier></entity>
    <period><startDate>2022-07-01</startDate><endDate>2022-09-30</endDate></period>
  </context>
  <context id="i2023">
    <entity><identifier scheme="http://www.sec.gov/CIK">0001234567</identifier></entity>
    <period><instant>2023-09-30</instant></period>
  </context>
  <context id="i2022">
    <entity><identifier scheme="http://www.sec.gov/CIK">0001234567</identifier></entity>
    <period><instant>2022-12-31</instant></period>
  </context>
  <context id="i2023_jv">
    <entity>
      <identifier scheme="http://www.sec.gov/CIK">0001234567</identifier>
      <segment>
        <xbrldi:explicitMember dimension="us-gaap:RelatedPartyTransactionsByRelatedPartyAxis">abc:JointVentureMember</xbrldi:explicitMember>
      </segment>
    </entity>
    <period><instant>2023-09-30</instant></period>
  </context>
  <unit id="usd"><measure>iso4217:USD</measure></unit>
  <dei:DocumentType contextRef="q3_2023">10-Q</dei:DocumentType>
  <dei:DocumentPeriodEndDate contextRef="q3_2023">2023-09-30</dei:DocumentPeriodEndDate>
  <dei:DocumentFiscalYearFocus contextRef="q3_2023">2023</dei:DocumentFiscalYearFocus>
  <dei:DocumentFiscalPeriodFocus contextRef="q3_2023">Q3</dei:DocumentFiscalPeriodFocus>
  <us-gaap:Assets contextRef="i2023" unitRef="usd" decimals="-3">900000000</us-gaap:Assets>
  <us-gaap:Assets contextRef="i2022" unitRef="usd" decimals="-3">850000000</us-gaap:Assets>
  <us-gaap:Liabilities contextRef="i2023" unitRef="usd" decimals="-3">500000000</us-gaap:Liabilities>
  <us-gaap:Liabilities contextRef="i2022" unitRef="usd" decimals="-3">480000000</us-gaap:Liabilities>
  <us-gaap:StockholdersEquity contextRef="i2023" unitRef="usd" decimals="-3">400000000</us-gaap:StockholdersEquity>
  <us-gaap:StockholdersEquity contextRef="i2022" unitRef="usd" decimals="-3">370000000</us-gaap:StockholdersEquity>
  <us-gaap:LongTermDebt contextRef="i2023" unitRef="usd" decimals="-3">250000000</us-gaap:LongTermDebt>
  <us-gaap:LongTermDebt contextRef="i2023_jv" unitRef="usd" decimals="-5">150700000</us-gaap:LongTermDebt>
  <us-gaap:Revenues contextRef="q3_2023" unitRef="usd" decimals="-3">120000000</us-gaap:Revenues>
  <us-gaap:Revenues contextRef="q3_2022" unitRef="usd" decimals="-3">110000000</us-gaap:Revenues>
  <us-gaap:CostOfRevenue contextRef="q3_2023" unitRef="usd" decimals="-3">70000000</us-gaap:CostOfRevenue>
  <us-gaap:CostOfRevenue contextRef="q3_2022" unitRef="usd" decimals="-3">65000000</us-gaap:CostOfRevenue>
  <us-gaap:GrossProfit contextRef="q3_2023" unitRef="usd" decimals="-3">50000000</us-gaap:GrossProfit>
  <us-gaap:GrossProfit contextRef="q3_2022" unitRef="usd" decimals="-3">45000000</us-gaap:GrossProfit>
  <us-gaap:ComprehensiveIncomeNetOfTax contextRef="q3_2023" unitRef="usd" decimals="-3">30000000</us-gaap:ComprehensiveIncomeNetOfTax>
</xbrl>"#;

fn filing() -> hobart_xbrl::FilingXbrl {
    let resolver = StaticResolver::new()
        .with("abc.xsd", SCHEMA.as_bytes().to_vec())
        .with("abc_pre.xml", PRE.as_bytes().to_vec())
        .with("abc_cal.xml", CAL.as_bytes().to_vec())
        .with("abc_def.xml", DEF.as_bytes().to_vec())
        .with("abc_lab.xml", LAB.as_bytes().to_vec());
    parse_filing(INSTANCE.as_bytes(), &resolver).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_income_statement_renders_both_quarters() {
    let filing = filing();
    let stmt = render_statement(
        &filing,
        StatementType::IncomeStatement,
        &StatementOptions::default(),
    );

    // A 10-Q with a prior-year comparative must produce both columns.
    let q3_2023 = PeriodKey::duration(date(2023, 7, 1), date(2023, 9, 30));
    let q3_2022 = PeriodKey::duration(date(2022, 7, 1), date(2022, 9, 30));
    assert!(stmt.periods.contains(&q3_2023), "missing current quarter");
    assert!(stmt.periods.contains(&q3_2022), "missing prior-year quarter");

    let revenue = stmt.row(&QName::new("us-gaap:Revenues")).unwrap();
    assert_eq!(revenue.value(&q3_2023), Some(Decimal::from(120_000_000)));
    assert_eq!(revenue.value(&q3_2022), Some(Decimal::from(110_000_000)));
    assert_eq!(revenue.label, "Net revenue");
}

#[test]
fn test_income_vs_comprehensive_income_resolution() {
    let filing = filing();

    let income = render_statement(
        &filing,
        StatementType::IncomeStatement,
        &StatementOptions::default(),
    );
    assert_eq!(
        income.role.as_deref(),
        Some("http://www.example.com/role/ConsolidatedStatementsOfIncome")
    );
    assert!(income.row(&QName::new("us-gaap:Revenues")).is_some());

    let comprehensive = render_statement(
        &filing,
        StatementType::ComprehensiveIncome,
        &StatementOptions::default(),
    );
    assert_eq!(
        comprehensive.role.as_deref(),
        Some("http://www.example.com/role/ConsolidatedStatementsOfComprehensiveIncomeLoss")
    );
    assert!(
        comprehensive
            .row(&QName::new("us-gaap:ComprehensiveIncomeNetOfTax"))
            .is_some()
    );
}

#[test]
fn test_dimensional_balance_sheet_row() {
    let filing = filing();
    let options = StatementOptions {
        include_dimensions: Some(true),
        ..StatementOptions::default()
    };
    let stmt = render_statement(&filing, StatementType::BalanceSheet, &options);

    let instant = PeriodKey::instant(date(2023, 9, 30));
    let dimensional: Vec<_> = stmt
        .rows
        .iter()
        .filter(|r| r.is_dimensional && r.concept.local_name().contains("LongTermDebt"))
        .collect();
    assert_eq!(dimensional.len(), 1);

    let row = dimensional[0];
    assert_eq!(row.value(&instant), Some(Decimal::from(150_700_000)));
    assert_eq!(
        row.dimension_axis,
        Some(QName::new("us-gaap:RelatedPartyTransactionsByRelatedPartyAxis"))
    );
    assert_eq!(row.dimension_member, Some(QName::new("abc:JointVentureMember")));
    assert_eq!(row.label, "Joint Venture");
}

#[test]
fn test_dimension_filter_preserves_non_dimensional_rows() {
    let filing = filing();
    let with = render_statement(
        &filing,
        StatementType::BalanceSheet,
        &StatementOptions {
            include_dimensions: Some(true),
            ..StatementOptions::default()
        },
    );
    let without = render_statement(
        &filing,
        StatementType::BalanceSheet,
        &StatementOptions {
            include_dimensions: Some(false),
            ..StatementOptions::default()
        },
    );

    assert!(with.rows.len() > without.rows.len());
    assert_eq!(
        with.non_dimensional_rows().len(),
        without.non_dimensional_rows().len()
    );
    assert!(without.rows.iter().all(|r| !r.is_dimensional));
}

#[test]
fn test_abstract_rows_have_no_values() {
    let filing = filing();
    for statement_type in [
        StatementType::BalanceSheet,
        StatementType::IncomeStatement,
        StatementType::ComprehensiveIncome,
    ] {
        let stmt = render_statement(&filing, statement_type, &StatementOptions::default());
        for row in &stmt.rows {
            if row.is_abstract {
                assert!(
                    row.values.values().all(Option::is_none),
                    "abstract row {} carries values",
                    row.concept
                );
            }
        }
    }
}

#[test]
fn test_every_rendered_value_has_a_source_fact() {
    let filing = filing();
    let stmt = render_statement(
        &filing,
        StatementType::IncomeStatement,
        &StatementOptions::default(),
    );

    for row in stmt.non_dimensional_rows() {
        for period in &stmt.periods {
            if row.value(period).is_some() {
                assert!(
                    filing.facts.fact_at(&row.concept, period).is_some(),
                    "no source fact for {} at {}",
                    row.concept,
                    period
                );
            }
        }
    }
}

#[test]
fn test_sign_and_total_flags() {
    let filing = filing();
    let stmt = render_statement(
        &filing,
        StatementType::IncomeStatement,
        &StatementOptions::default(),
    );

    // Negated preferred label flips the display sign; the value is stored
    // as reported.
    let cost = stmt.row(&QName::new("us-gaap:CostOfRevenue")).unwrap();
    assert_eq!(cost.preferred_sign, hobart_statements::SignPreference::Negated);
    assert_eq!(cost.weight, Some(-1.0));
    let q3_2023 = PeriodKey::duration(date(2023, 7, 1), date(2023, 9, 30));
    assert_eq!(cost.value(&q3_2023), Some(Decimal::from(70_000_000)));

    // Calculation root marks the total and the preferred total label wins.
    let gross = stmt.row(&QName::new("us-gaap:GrossProfit")).unwrap();
    assert!(gross.is_total);
    assert_eq!(gross.label, "Total gross profit");
}

#[test]
fn test_calculation_additivity() {
    let filing = filing();
    let stmt = render_statement(
        &filing,
        StatementType::IncomeStatement,
        &StatementOptions::default(),
    );
    let calc = &filing.taxonomy.calculation["http://www.example.com/role/ConsolidatedStatementsOfIncome"];

    let failures = checks::check_calculation(&stmt, calc, hobart_xbrl::Decimals::Digits(-3));
    assert!(failures.is_empty(), "additivity failures: {failures:?}");
}

#[test]
fn test_balance_sheet_equation_advisory() {
    let filing = filing();
    let stmt = render_statement(
        &filing,
        StatementType::BalanceSheet,
        &StatementOptions::default(),
    );
    assert!(checks::check_balance_sheet_equation(&stmt, 0.5).is_empty());
}

#[test]
fn test_no_matching_statement_yields_empty_with_diagnostic() {
    let filing = filing();
    let stmt = render_statement(
        &filing,
        StatementType::CashFlow,
        &StatementOptions::default(),
    );
    assert!(stmt.is_empty());
    assert!(!stmt.diagnostics.is_empty());
}

#[test]
fn test_resolution_is_deterministic() {
    let filing = filing();
    let a = resolve_statement_role(&filing.taxonomy, StatementType::IncomeStatement).unwrap();
    let b = resolve_statement_role(&filing.taxonomy, StatementType::IncomeStatement).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_stitch_over_rendered_statements() {
    let filing = filing();
    let mut current = render_statement(
        &filing,
        StatementType::IncomeStatement,
        &StatementOptions::default(),
    );
    current.filing_id = Some("0001234567-23-000042".to_string());

    // Stitching a single statement is the degenerate case: same periods,
    // same rows, full provenance.
    let stitched = stitch_statements(
        std::slice::from_ref(&current),
        &StitchOptions::default(),
    );
    assert_eq!(stitched.periods, current.periods);
    let q3_2023 = PeriodKey::duration(date(2023, 7, 1), date(2023, 9, 30));
    let row_idx = stitched
        .rows
        .iter()
        .position(|r| r.concept == QName::new("us-gaap:Revenues"))
        .unwrap();
    assert_eq!(
        stitched.provenance_of(row_idx, &q3_2023),
        Some("0001234567-23-000042")
    );
}
