//! Column names read by the dashboard

pub const PLATE: &str = "Immatriculation";
pub const DIRECTION: &str = "Direction";
pub const DATE: &str = "Date";

// Mileage
pub const MILEAGE: &str = "Kilométrage";
pub const KM_TRAVELED: &str = "Km_Parcourus";

// Costs
pub const TOTAL_COST: &str = "Coût_Total";
pub const TOTAL_PRICE: &str = "Prix_Total";
pub const UNIT_PRICE: &str = "Prix_Unitaire";
pub const PURCHASE_PRICE: &str = "Prix_Achat";
pub const AMOUNT: &str = "Montant";
pub const QUANTITY: &str = "Quantité";

// Fuel
pub const LITERS: &str = "Litres";
pub const LITER_PRICE: &str = "Prix_Litre";
pub const FUEL_TOTAL: &str = "Total_Ar";
pub const FUEL_TYPE: &str = "Type_Carburant";

// Insurance and inspections
pub const END_DATE: &str = "Date_Fin";
pub const STATE: &str = "Etat";
pub const EXPIRED: &str = "Expiré";

// Categories used by charts
pub const MAINTENANCE_TYPE: &str = "Type_Entretien";
pub const WORKSHOP_ENTRY_DATE: &str = "Date d_entrée à Andraharo";
pub const FAILURE: &str = "Panne";
pub const SERVICE_TYPE: &str = "Type de Prestation";
pub const SUPPLIER_NAME: &str = "Nom_du_fournisseur";

/// Columns containing this marker hold years, never dates
pub const YEAR_MARKER: &str = "Année";

/// Measure columns never reinterpreted as serial dates
pub const MEASURES: &[&str] = &[
    MILEAGE,
    KM_TRAVELED,
    TOTAL_COST,
    TOTAL_PRICE,
    UNIT_PRICE,
    PURCHASE_PRICE,
    AMOUNT,
    QUANTITY,
    LITERS,
    LITER_PRICE,
    FUEL_TOTAL,
];
