//! Diagnostic message table.
//!
//! Codes and templates follow the TypeScript compiler's numbering so that
//! findings line up with what `tsc` reports for the same program. Templates
//! use `{0}`, `{1}`, ... placeholders filled by `format_message`.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const A_REQUIRED_PARAMETER_CANNOT_FOLLOW_AN_OPTIONAL_PARAMETER: u32 = 1016;
    pub const A_REST_PARAMETER_MUST_BE_LAST_IN_A_PARAMETER_LIST: u32 = 1014;
    pub const CANNOT_FIND_NAME: u32 = 2304;
    pub const TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE: u32 = 2310;
    pub const NAMED_PROPERTY_OF_TYPES_ARE_NOT_IDENTICAL: u32 = 2319;
    pub const INTERFACE_CANNOT_SIMULTANEOUSLY_EXTEND_TYPES: u32 = 2320;
    pub const TYPE_IS_NOT_ASSIGNABLE_TO_TYPE: u32 = 2322;
    pub const PROPERTY_DOES_NOT_EXIST_ON_TYPE: u32 = 2339;
    pub const ARGUMENT_TYPE_IS_NOT_ASSIGNABLE_TO_PARAMETER_TYPE: u32 = 2345;
    pub const THIS_EXPRESSION_IS_NOT_CALLABLE: u32 = 2349;
    pub const OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES: u32 = 2353;
    pub const THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL: u32 = 2367;
    pub const A_REST_PARAMETER_MUST_BE_OF_AN_ARRAY_TYPE: u32 = 2370;
    pub const INTERFACE_INCORRECTLY_EXTENDS_INTERFACE: u32 = 2430;
    pub const VARIABLE_IS_USED_BEFORE_BEING_ASSIGNED: u32 = 2454;
    pub const TUPLE_TYPE_OF_LENGTH_HAS_NO_ELEMENT_AT_INDEX: u32 = 2493;
    pub const OBJECT_IS_POSSIBLY_UNDEFINED: u32 = 2532;
    pub const CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_READ_ONLY_PROPERTY: u32 = 2540;
    pub const INDEX_SIGNATURE_IN_TYPE_ONLY_PERMITS_READING: u32 = 2542;
    pub const EXPECTED_ARGUMENTS_BUT_GOT: u32 = 2554;
    pub const EXPECTED_AT_LEAST_ARGUMENTS_BUT_GOT: u32 = 2555;
    pub const A_SPREAD_ARGUMENT_MUST_EITHER_HAVE_A_TUPLE_TYPE_OR_BE_PASSED_TO_A_REST_PARAMETER:
        u32 = 2556;
    pub const SUBSEQUENT_PROPERTY_DECLARATIONS_MUST_HAVE_THE_SAME_TYPE: u32 = 2717;
    pub const PROPERTY_IS_MISSING_IN_TYPE_BUT_REQUIRED_IN_TYPE: u32 = 2741;
    pub const THE_TYPE_IS_READONLY_AND_CANNOT_BE_ASSIGNED_TO_THE_MUTABLE_TYPE: u32 = 4104;
    pub const PARAMETER_IMPLICITLY_HAS_AN_ANY_TYPE: u32 = 7006;
    pub const ELEMENT_IMPLICITLY_HAS_AN_ANY_TYPE_BECAUSE_TYPE_HAS_NO_INDEX_SIGNATURE: u32 =
        7017;
    pub const UNREACHABLE_CODE_DETECTED: u32 = 7027;
    pub const TYPES_OF_PROPERTY_ARE_INCOMPATIBLE: u32 = 2326;
    pub const PROPERTY_IS_OPTIONAL_IN_TYPE_BUT_REQUIRED_IN_TYPE: u32 = 2327;
    pub const TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE: u32 = 2328;
    pub const SOURCE_HAS_ELEMENTS_BUT_TARGET_REQUIRES: u32 = 2618;
    pub const SOURCE_HAS_ELEMENTS_BUT_TARGET_ALLOWS_ONLY: u32 = 2619;
    pub const TARGET_REQUIRES_ELEMENTS_BUT_SOURCE_MAY_HAVE_FEWER: u32 = 2620;
    pub const TARGET_SIGNATURE_PROVIDES_TOO_FEW_ARGUMENTS: u32 = 2849;
    pub const UNION_TYPE_MUST_HAVE_AT_LEAST_ONE_MEMBER: u32 = 90_001;
}

pub mod diagnostic_messages {
    pub const A_REQUIRED_PARAMETER_CANNOT_FOLLOW_AN_OPTIONAL_PARAMETER: &str =
        "A required parameter cannot follow an optional parameter.";
    pub const A_REST_PARAMETER_MUST_BE_LAST_IN_A_PARAMETER_LIST: &str =
        "A rest parameter must be last in a parameter list.";
    pub const CANNOT_FIND_NAME: &str = "Cannot find name '{0}'.";
    pub const TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE: &str =
        "Type '{0}' recursively references itself as a base type.";
    pub const NAMED_PROPERTY_OF_TYPES_ARE_NOT_IDENTICAL: &str =
        "Named property '{0}' of types '{1}' and '{2}' are not identical.";
    pub const INTERFACE_CANNOT_SIMULTANEOUSLY_EXTEND_TYPES: &str =
        "Interface '{0}' cannot simultaneously extend types '{1}' and '{2}'.";
    pub const TYPE_IS_NOT_ASSIGNABLE_TO_TYPE: &str = "Type '{0}' is not assignable to type '{1}'.";
    pub const PROPERTY_DOES_NOT_EXIST_ON_TYPE: &str =
        "Property '{0}' does not exist on type '{1}'.";
    pub const ARGUMENT_TYPE_IS_NOT_ASSIGNABLE_TO_PARAMETER_TYPE: &str =
        "Argument of type '{0}' is not assignable to parameter of type '{1}'.";
    pub const THIS_EXPRESSION_IS_NOT_CALLABLE: &str =
        "This expression is not callable.  Type '{0}' has no call signatures.";
    pub const OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES: &str = "Object literal may only specify known properties, and '{0}' does not exist in type '{1}'.";
    pub const THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL: &str = "This comparison appears to be unintentional because the types '{0}' and '{1}' have no overlap.";
    pub const A_REST_PARAMETER_MUST_BE_OF_AN_ARRAY_TYPE: &str =
        "A rest parameter must be of an array type.";
    pub const INTERFACE_INCORRECTLY_EXTENDS_INTERFACE: &str =
        "Interface '{0}' incorrectly extends interface '{1}'.";
    pub const VARIABLE_IS_USED_BEFORE_BEING_ASSIGNED: &str =
        "Variable '{0}' is used before being assigned.";
    pub const TUPLE_TYPE_OF_LENGTH_HAS_NO_ELEMENT_AT_INDEX: &str =
        "Tuple type '{0}' of length '{1}' has no element at index '{2}'.";
    pub const OBJECT_IS_POSSIBLY_UNDEFINED: &str = "Object is possibly 'undefined'.";
    pub const CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_READ_ONLY_PROPERTY: &str =
        "Cannot assign to '{0}' because it is a read-only property.";
    pub const INDEX_SIGNATURE_IN_TYPE_ONLY_PERMITS_READING: &str =
        "Index signature in type '{0}' only permits reading.";
    pub const EXPECTED_ARGUMENTS_BUT_GOT: &str = "Expected {0} arguments, but got {1}.";
    pub const EXPECTED_AT_LEAST_ARGUMENTS_BUT_GOT: &str =
        "Expected at least {0} arguments, but got {1}.";
    pub const A_SPREAD_ARGUMENT_MUST_EITHER_HAVE_A_TUPLE_TYPE_OR_BE_PASSED_TO_A_REST_PARAMETER:
        &str = "A spread argument must either have a tuple type or be passed to a rest parameter.";
    pub const SUBSEQUENT_PROPERTY_DECLARATIONS_MUST_HAVE_THE_SAME_TYPE: &str = "Subsequent property declarations must have the same type.  Property '{0}' must be of type '{1}', but here has type '{2}'.";
    pub const PROPERTY_IS_MISSING_IN_TYPE_BUT_REQUIRED_IN_TYPE: &str =
        "Property '{0}' is missing in type '{1}' but required in type '{2}'.";
    pub const THE_TYPE_IS_READONLY_AND_CANNOT_BE_ASSIGNED_TO_THE_MUTABLE_TYPE: &str =
        "The type '{0}' is 'readonly' and cannot be assigned to the mutable type '{1}'.";
    pub const PARAMETER_IMPLICITLY_HAS_AN_ANY_TYPE: &str =
        "Parameter '{0}' implicitly has an '{1}' type.";
    pub const ELEMENT_IMPLICITLY_HAS_AN_ANY_TYPE_BECAUSE_TYPE_HAS_NO_INDEX_SIGNATURE: &str =
        "Element implicitly has an 'any' type because type '{0}' has no index signature.";
    pub const UNREACHABLE_CODE_DETECTED: &str = "Unreachable code detected.";
    pub const TYPES_OF_PROPERTY_ARE_INCOMPATIBLE: &str = "Types of property '{0}' are incompatible.";
    pub const PROPERTY_IS_OPTIONAL_IN_TYPE_BUT_REQUIRED_IN_TYPE: &str =
        "Property '{0}' is optional in type '{1}' but required in type '{2}'.";
    pub const TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE: &str =
        "Types of parameters '{0}' and '{1}' are incompatible.";
    pub const SOURCE_HAS_ELEMENTS_BUT_TARGET_REQUIRES: &str =
        "Source has {0} element(s) but target requires {1}.";
    pub const SOURCE_HAS_ELEMENTS_BUT_TARGET_ALLOWS_ONLY: &str =
        "Source has {0} element(s) but target allows only {1}.";
    pub const TARGET_REQUIRES_ELEMENTS_BUT_SOURCE_MAY_HAVE_FEWER: &str =
        "Target requires {0} element(s) but source may have fewer.";
    pub const TARGET_SIGNATURE_PROVIDES_TOO_FEW_ARGUMENTS: &str =
        "Target signature provides too few arguments. Expected {0} or more, but got {1}.";
    pub const UNION_TYPE_MUST_HAVE_AT_LEAST_ONE_MEMBER: &str =
        "A union type must have at least one member.";
}

macro_rules! message {
    ($name:ident, $category:ident) => {
        DiagnosticMessage {
            code: diagnostic_codes::$name,
            category: DiagnosticCategory::$category,
            message: diagnostic_messages::$name,
        }
    };
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    message!(A_REST_PARAMETER_MUST_BE_LAST_IN_A_PARAMETER_LIST, Error),
    message!(A_REQUIRED_PARAMETER_CANNOT_FOLLOW_AN_OPTIONAL_PARAMETER, Error),
    message!(CANNOT_FIND_NAME, Error),
    message!(TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE, Error),
    message!(NAMED_PROPERTY_OF_TYPES_ARE_NOT_IDENTICAL, Message),
    message!(INTERFACE_CANNOT_SIMULTANEOUSLY_EXTEND_TYPES, Error),
    message!(TYPE_IS_NOT_ASSIGNABLE_TO_TYPE, Error),
    message!(PROPERTY_DOES_NOT_EXIST_ON_TYPE, Error),
    message!(ARGUMENT_TYPE_IS_NOT_ASSIGNABLE_TO_PARAMETER_TYPE, Error),
    message!(THIS_EXPRESSION_IS_NOT_CALLABLE, Error),
    message!(OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES, Error),
    message!(THIS_COMPARISON_APPEARS_TO_BE_UNINTENTIONAL, Suggestion),
    message!(A_REST_PARAMETER_MUST_BE_OF_AN_ARRAY_TYPE, Error),
    message!(INTERFACE_INCORRECTLY_EXTENDS_INTERFACE, Error),
    message!(VARIABLE_IS_USED_BEFORE_BEING_ASSIGNED, Error),
    message!(TUPLE_TYPE_OF_LENGTH_HAS_NO_ELEMENT_AT_INDEX, Error),
    message!(OBJECT_IS_POSSIBLY_UNDEFINED, Error),
    message!(CANNOT_ASSIGN_TO_BECAUSE_IT_IS_A_READ_ONLY_PROPERTY, Error),
    message!(INDEX_SIGNATURE_IN_TYPE_ONLY_PERMITS_READING, Error),
    message!(EXPECTED_ARGUMENTS_BUT_GOT, Error),
    message!(EXPECTED_AT_LEAST_ARGUMENTS_BUT_GOT, Error),
    message!(
        A_SPREAD_ARGUMENT_MUST_EITHER_HAVE_A_TUPLE_TYPE_OR_BE_PASSED_TO_A_REST_PARAMETER,
        Error
    ),
    message!(SUBSEQUENT_PROPERTY_DECLARATIONS_MUST_HAVE_THE_SAME_TYPE, Error),
    message!(PROPERTY_IS_MISSING_IN_TYPE_BUT_REQUIRED_IN_TYPE, Error),
    message!(THE_TYPE_IS_READONLY_AND_CANNOT_BE_ASSIGNED_TO_THE_MUTABLE_TYPE, Error),
    message!(PARAMETER_IMPLICITLY_HAS_AN_ANY_TYPE, Error),
    message!(
        ELEMENT_IMPLICITLY_HAS_AN_ANY_TYPE_BECAUSE_TYPE_HAS_NO_INDEX_SIGNATURE,
        Error
    ),
    message!(UNREACHABLE_CODE_DETECTED, Suggestion),
    message!(TYPES_OF_PROPERTY_ARE_INCOMPATIBLE, Message),
    message!(PROPERTY_IS_OPTIONAL_IN_TYPE_BUT_REQUIRED_IN_TYPE, Message),
    message!(TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE, Message),
    message!(SOURCE_HAS_ELEMENTS_BUT_TARGET_REQUIRES, Message),
    message!(SOURCE_HAS_ELEMENTS_BUT_TARGET_ALLOWS_ONLY, Message),
    message!(TARGET_REQUIRES_ELEMENTS_BUT_SOURCE_MAY_HAVE_FEWER, Message),
    message!(TARGET_SIGNATURE_PROVIDES_TOO_FEW_ARGUMENTS, Message),
    message!(UNION_TYPE_MUST_HAVE_AT_LEAST_ONE_MEMBER, Error),
];
